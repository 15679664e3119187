//! Controlled vocabularies for the fixed-choice profile fields.

/// Declares a closed set of labels that (de)serialize as their display text.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .find(|item| item.label().eq_ignore_ascii_case(s))
                    .copied()
                    .ok_or_else(|| format!("{s:?} is not a valid {}", stringify!($name)))
            }
        }
    };
}

vocabulary!(Want {
    Mentorship => "Mentorship",
    Travel => "Travel",
    LongTerm => "Long-term",
    Discreet => "Discreet",
    Casual => "Casual",
    Friendship => "Friendship",
    Allowance => "Allowance",
    Networking => "Networking",
});

vocabulary!(Interest {
    Art => "Art",
    FineDining => "Fine Dining",
    Fitness => "Fitness",
    Music => "Music",
    Travel => "Travel",
    Fashion => "Fashion",
    Reading => "Reading",
    Sports => "Sports",
    Movies => "Movies",
    Gaming => "Gaming",
    Cooking => "Cooking",
    Nightlife => "Nightlife",
});

vocabulary!(BodyType {
    Slim => "Slim",
    Athletic => "Athletic",
    Average => "Average",
    Curvy => "Curvy",
    Muscular => "Muscular",
    FewExtraPounds => "A Few Extra Pounds",
});

vocabulary!(Ethnicity {
    Asian => "Asian",
    Black => "Black",
    Hispanic => "Hispanic/Latino",
    MiddleEastern => "Middle Eastern",
    Mixed => "Mixed",
    NativeAmerican => "Native American",
    PacificIslander => "Pacific Islander",
    SouthAsian => "South Asian",
    White => "White",
    Other => "Other",
});

vocabulary!(HairColor {
    Black => "Black",
    Brown => "Brown",
    Blonde => "Blonde",
    Red => "Red",
    Gray => "Gray",
    Bald => "Bald",
    Other => "Other",
});

vocabulary!(EyeColor {
    Brown => "Brown",
    Blue => "Blue",
    Green => "Green",
    Hazel => "Hazel",
    Gray => "Gray",
    Other => "Other",
});

vocabulary!(
    /// Used for both the smoker and drinker fields.
    Habit {
        Never => "Never",
        Socially => "Socially",
        Regularly => "Regularly",
    }
);

vocabulary!(
    /// Used for both the piercings and tattoos fields.
    Amount {
        Zero => "None",
        Few => "Some",
        Many => "Many",
    }
);
