use crate::utils::title_case;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeColor {
    pub name: &'static str,
    pub css: &'static str,
    pub rgb: (u8, u8, u8),
}

const fn color(name: &'static str, css: &'static str, rgb: (u8, u8, u8)) -> TypeColor {
    TypeColor { name, css, rgb }
}

// table order is also the priority order used to pick the primary type
pub const TYPE_COLORS: [TypeColor; 18] = [
    color("fire", "orange", (255, 165, 0)),
    color("grass", "lightgreen", (144, 238, 144)),
    color("electric", "yellow", (255, 255, 0)),
    color("water", "#70ffea", (0x70, 0xff, 0xea)),
    color("ground", "darkgrey", (169, 169, 169)),
    color("rock", "grey", (128, 128, 128)),
    color("fairy", "pink", (255, 192, 203)),
    color("poison", "greenyellow", (173, 255, 47)),
    color("bug", "#94ecbe", (0x94, 0xec, 0xbe)),
    color("dragon", "orange", (255, 165, 0)),
    color("psychic", "#7c7db6", (0x7c, 0x7d, 0xb6)),
    color("flying", "#fcca46", (0xfc, 0xca, 0x46)),
    color("fighting", "darkgrey", (169, 169, 169)),
    color("normal", "lightgrey", (211, 211, 211)),
    color("ice", "#00f2f2", (0x00, 0xf2, 0xf2)),
    color("dark", "#4f7ecf", (0x4f, 0x7e, 0xcf)),
    color("ghost", "#7685a7", (0x76, 0x85, 0xa7)),
    color("steel", "steelblue", (70, 130, 180)),
];

/// First known type, in priority order, that the record carries.
pub fn primary_type<S: AsRef<str>>(types: &[S]) -> Option<&'static TypeColor> {
    TYPE_COLORS
        .iter()
        .find(|entry| types.iter().any(|t| t.as_ref() == entry.name))
}

pub fn type_color<S: AsRef<str>>(types: &[S]) -> Option<&'static TypeColor> {
    primary_type(types)
}

pub fn type_label<S: AsRef<str>>(types: &[S]) -> String {
    match types {
        [] => String::new(),
        [only] => title_case(only.as_ref()),
        [first, second, ..] => format!(
            "{} / {}",
            title_case(first.as_ref()),
            title_case(second.as_ref())
        ),
    }
}
