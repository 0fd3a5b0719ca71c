//! Display helpers deriving deterministic avatar colors and initials from an
//! identifier (email or room name).

/// An HSL color with fixed saturation and lightness; only the hue varies per
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarColor {
    /// Hue in degrees, `0..360`.
    pub hue: u16,
}

impl AvatarColor {
    /// Saturation percentage used for every avatar.
    pub const SATURATION: u8 = 70;
    /// Lightness percentage used for every avatar.
    pub const LIGHTNESS: u8 = 50;
}

impl std::fmt::Display for AvatarColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, Self::SATURATION, Self::LIGHTNESS)
    }
}

/// Deterministic color for an identifier.
///
/// Uses the classic shift-and-subtract string hash so the same email always
/// renders with the same hue on every participant's screen.
pub fn avatar_color(identifier: &str) -> AvatarColor {
    let mut hash: i32 = 0;
    for c in identifier.chars() {
        hash = (c as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }
    AvatarColor { hue: hash.rem_euclid(360) as u16 }
}

/// First two characters of the mailbox name (the part before `@`),
/// uppercased. Room names have no `@` and use their first two characters.
pub fn initials(identifier: &str) -> String {
    identifier
        .split('@')
        .next()
        .unwrap_or_default()
        .chars()
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_deterministic() {
        assert_eq!(avatar_color("alice@x.com"), avatar_color("alice@x.com"));
    }

    #[test]
    fn hue_is_in_range() {
        for id in ["", "a", "alice@x.com", "Study", "日本語"] {
            assert!(avatar_color(id).hue < 360, "hue out of range for {id:?}");
        }
    }

    #[test]
    fn initials_from_email() {
        assert_eq!(initials("alice@x.com"), "AL");
        assert_eq!(initials("bob@x.com"), "BO");
    }

    #[test]
    fn initials_from_room_name() {
        assert_eq!(initials("Study"), "ST");
        assert_eq!(initials("x"), "X");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn renders_as_hsl() {
        let color = AvatarColor { hue: 42 };
        assert_eq!(color.to_string(), "hsl(42, 70%, 50%)");
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            #[test]
            fn prop_hue_always_in_range(identifier in "\\PC{0,64}") {
                prop_assert!(avatar_color(&identifier).hue < 360);
            }

            #[test]
            fn prop_initials_at_most_two_source_chars(identifier in "\\PC{0,64}") {
                let initials = initials(&identifier);
                // Two source characters, each uppercasing to at most three
                prop_assert!(initials.chars().count() <= 6);
                prop_assert_eq!(initials.to_uppercase(), initials.clone());
            }
        }
    }
}
