//! Integer-backed enumerations used by the producer.
//!
//! The numeric bindings are part of the wire format and are kept exactly as
//! the producer defines them, including the `-1` bases and the out-of-order
//! `Sector` values. Snapshot fields keep the raw code; these types are the
//! typed view over it.

use serde::Serialize;

use super::error::UnknownCode;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(i8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn code(self) -> i8 {
                self as i8
            }

            pub const fn from_code(code: i8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl TryFrom<i8> for $name {
            type Error = UnknownCode;

            fn try_from(code: i8) -> Result<Self, Self::Error> {
                Self::from_code(code).ok_or(UnknownCode {
                    kind: stringify!($name),
                    code,
                })
            }
        }

        impl From<$name> for i8 {
            fn from(value: $name) -> i8 {
                value.code()
            }
        }
    };
}

wire_enum! {
    /// Session phase.
    pub enum GamePhase {
        Garage = 0,
        WarmUp = 1,
        GridWalk = 2,
        Formation = 3,
        Countdown = 4,
        GreenFlag = 5,
        FullCourseYellow = 6,
        SessionStopped = 7,
        SessionOver = 8,
    }
}

wire_enum! {
    /// Full-course yellow state.
    pub enum YellowFlagState {
        Invalid = -1,
        NoFlag = 0,
        Pending = 1,
        PitClosed = 2,
        PitLeadLap = 3,
        PitOpen = 4,
        LastLap = 5,
        Resume = 6,
        RaceHalt = 7,
    }
}

wire_enum! {
    pub enum SurfaceType {
        Dry = 0,
        Wet = 1,
        Grass = 2,
        Dirt = 3,
        Gravel = 4,
        /// Rumble strip.
        Kerb = 5,
    }
}

wire_enum! {
    /// Current sector; the producer numbers sector 3 as zero.
    pub enum Sector {
        Sector3 = 0,
        Sector1 = 1,
        Sector2 = 2,
    }
}

wire_enum! {
    pub enum FinishStatus {
        None = 0,
        Finished = 1,
        Dnf = 2,
        Dq = 3,
    }
}

wire_enum! {
    /// Who is in control of a vehicle.
    pub enum ControlSource {
        Nobody = -1,
        Player = 0,
        Ai = 1,
        Remote = 2,
        Replay = 3,
    }
}

wire_enum! {
    /// Position of a wheel in `Snapshot::wheels`.
    pub enum WheelIndex {
        FrontLeft = 0,
        FrontRight = 1,
        RearLeft = 2,
        RearRight = 3,
    }
}

impl WheelIndex {
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_producer_bindings() {
        assert_eq!(GamePhase::Garage.code(), 0);
        assert_eq!(GamePhase::GreenFlag.code(), 5);
        assert_eq!(GamePhase::SessionOver.code(), 8);
        assert_eq!(YellowFlagState::Invalid.code(), -1);
        assert_eq!(YellowFlagState::RaceHalt.code(), 7);
        assert_eq!(SurfaceType::Kerb.code(), 5);
        assert_eq!(FinishStatus::Dq.code(), 3);
        assert_eq!(ControlSource::Nobody.code(), -1);
        assert_eq!(ControlSource::Replay.code(), 3);
        assert_eq!(WheelIndex::RearLeft.index(), 2);
    }

    #[test]
    fn sector_numbering_is_not_sequential() {
        assert_eq!(Sector::Sector3.code(), 0);
        assert_eq!(Sector::Sector1.code(), 1);
        assert_eq!(Sector::Sector2.code(), 2);
        assert_eq!(Sector::from_code(0), Some(Sector::Sector3));
    }

    #[test]
    fn from_code_covers_every_variant() {
        for phase in GamePhase::ALL {
            assert_eq!(GamePhase::from_code(phase.code()), Some(*phase));
        }
        for state in YellowFlagState::ALL {
            assert_eq!(YellowFlagState::try_from(state.code()), Ok(*state));
        }
        assert_eq!(ControlSource::ALL.len(), 5);
    }

    #[test]
    fn unknown_codes_are_reported() {
        assert_eq!(GamePhase::from_code(9), None);
        let err = SurfaceType::try_from(-3).unwrap_err();
        assert_eq!(err.kind, "SurfaceType");
        assert_eq!(err.to_string(), "unknown SurfaceType code: -3");
    }

    #[test]
    fn into_raw_code() {
        let code: i8 = YellowFlagState::PitOpen.into();
        assert_eq!(code, 4);
    }
}
