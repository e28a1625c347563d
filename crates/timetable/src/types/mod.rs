//! Domain types shared by the grid, the validation engine and the REST client.
//!
//! Every enumeration here round-trips through the exact strings the backend
//! stores (roman numerals for semesters, capitalised weekday names, and so on).

use thiserror::Error;

/// Returned when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a fieldless enum that serializes as a fixed set of strings.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::types::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::types::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

// Declared after the macro so the submodules see it by textual scope.
mod entry;
mod people;
mod period;

pub use entry::*;
pub use people::*;
pub use period::*;

wire_enum! {
    /// Semester of study, written as a roman numeral.
    Semester, "semester" {
        First => "I",
        Second => "II",
        Third => "III",
        Fourth => "IV",
        Fifth => "V",
        Sixth => "VI",
        Seventh => "VII",
        Eighth => "VIII",
    }
}

wire_enum! {
    /// Class section within a semester.
    Section, "section" {
        A => "A",
        B => "B",
    }
}

wire_enum! {
    /// Teaching day. The week runs Monday through Saturday.
    Day, "day" {
        Monday => "Monday",
        Tuesday => "Tuesday",
        Wednesday => "Wednesday",
        Thursday => "Thursday",
        Friday => "Friday",
        Saturday => "Saturday",
    }
}

wire_enum! {
    /// Whether a class is a lecture or a laboratory session.
    EntryType, "entry type" {
        Theory => "Theory",
        Lab => "Lab",
    }
}

wire_enum! {
    /// Which half of the section attends.
    Batch, "batch" {
        Odd => "Odd",
        Even => "Even",
        Both => "Both",
    }
}

impl Default for Batch {
    fn default() -> Self {
        Batch::Both
    }
}

impl Day {
    /// Position of the day in the week, Monday = 0.
    pub fn index(&self) -> usize {
        match self {
            Day::Monday => 0,
            Day::Tuesday => 1,
            Day::Wednesday => 2,
            Day::Thursday => 3,
            Day::Friday => 4,
            Day::Saturday => 5,
        }
    }

    /// Three-letter upper-case label used in the grid's first column.
    pub fn short_label(&self) -> String {
        self.as_str()[..3].to_uppercase()
    }
}

/// The four laboratories that have their own timetable view.
pub const LAB_ROOMS: [&str; 4] = [
    "GEN AI LABORATORY",
    "DATA SCIENCE LABORATORY",
    "MACHINE LEARNING LABORATORY",
    "DEEP LEARNING LABORATORY",
];
