//! Cervical-mucus classification.
//!
//! Maps a (sensation, aspect) observation to a Sensiplan fertility code:
//! - `G+`: wet or slippery sensation, or egg-white / stretchy mucus
//! - `G`: creamy, yellowish or sticky mucus
//! - `h`: damp sensation
//! - `t`: dry sensation with nothing seen
//! - `--`: nothing felt and nothing seen
//!
//! Any other combination is read as `h`: doubt always resolves toward
//! fertility.

use crate::{MucusAspect, MucusCode, MucusSensation};

/// Classify a mucus observation. Missing values mean "nothing observed".
pub fn classify(sensation: Option<MucusSensation>, aspect: Option<MucusAspect>) -> MucusCode {
    let sensation = sensation.unwrap_or(MucusSensation::Nothing);
    let aspect = aspect.unwrap_or(MucusAspect::Nothing);

    if matches!(sensation, MucusSensation::Wet | MucusSensation::Slippery)
        || matches!(aspect, MucusAspect::EggWhite | MucusAspect::Stretchy)
    {
        return MucusCode::HighlyFertile;
    }

    if matches!(
        aspect,
        MucusAspect::Creamy | MucusAspect::Yellowish | MucusAspect::Sticky
    ) {
        return MucusCode::Fertile;
    }

    match (sensation, aspect) {
        (MucusSensation::Damp, _) => MucusCode::Damp,
        (MucusSensation::Dry, MucusAspect::Nothing) => MucusCode::Dry,
        (MucusSensation::Nothing, MucusAspect::Nothing) => MucusCode::NoObservation,
        _ => MucusCode::Damp,
    }
}

impl MucusCode {
    /// Ordinal fertility weight, higher is more fertile
    ///
    /// Only meaningful for comparisons between codes.
    pub fn weight(&self) -> u8 {
        match self {
            MucusCode::HighlyFertile => 4,
            MucusCode::Fertile => 3,
            MucusCode::Damp => 2,
            MucusCode::Dry => 1,
            MucusCode::NoObservation => 0,
        }
    }
}
