//! Flavor text: suggested player names and end-of-run commentary
//!
//! Both calls are opaque and may fail. Callers go through
//! [`name_or_fallback`] and [`commentary_or_fallback`], which always produce
//! something printable.

use crate::error::ClientError;
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;

pub const EMPTY_NAME_FALLBACK: &str = "Viper";
pub const FAILED_NAME_FALLBACK: &str = "Unknown";
pub const EMPTY_COMMENTARY_FALLBACK: &str = "Game Over. Try again!";
pub const FAILED_COMMENTARY_FALLBACK: &str = "Great effort! Play again?";

/// Input for [`FlavorText::commentary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub player_name: String,
    pub score: u32,
    pub kills: u32,
}

pub trait FlavorText {
    /// A short handle, at most 12 characters.
    fn suggest_name(&mut self) -> Result<String, ClientError>;

    /// One sentence about a finished run.
    fn commentary(&mut self, summary: &RunSummary) -> Result<String, ClientError>;
}

pub fn name_or_fallback<F: FlavorText + ?Sized>(service: &mut F) -> String {
    match service.suggest_name() {
        Ok(name) if name.trim().is_empty() => EMPTY_NAME_FALLBACK.to_string(),
        Ok(name) => name.trim().to_string(),
        Err(e) => {
            warn!("Name suggestion failed: {}", e);
            FAILED_NAME_FALLBACK.to_string()
        }
    }
}

pub fn commentary_or_fallback<F: FlavorText + ?Sized>(service: &mut F, summary: &RunSummary) -> String {
    match service.commentary(summary) {
        Ok(text) if text.trim().is_empty() => EMPTY_COMMENTARY_FALLBACK.to_string(),
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Commentary failed: {}", e);
            FAILED_COMMENTARY_FALLBACK.to_string()
        }
    }
}

const PREFIXES: [&str; 8] = [
    "Neon", "Void", "Turbo", "Pixel", "Astro", "Hyper", "Nova", "Quantum",
];
const SUFFIXES: [&str; 8] = [
    "Viper", "Noodle", "Fang", "Coil", "Mamba", "Slink", "Scale", "Cobra",
];

/// Word-list implementation that needs no network.
pub struct OfflineFlavor<R: Rng> {
    rng: R,
}

impl<R: Rng> OfflineFlavor<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> FlavorText for OfflineFlavor<R> {
    fn suggest_name(&mut self) -> Result<String, ClientError> {
        let prefix = PREFIXES
            .choose(&mut self.rng)
            .ok_or_else(|| ClientError::Flavor("no prefixes".to_string()))?;
        let suffix = SUFFIXES
            .choose(&mut self.rng)
            .ok_or_else(|| ClientError::Flavor("no suffixes".to_string()))?;

        let mut name = format!("{prefix}{suffix}");
        name.truncate(12);
        Ok(name)
    }

    fn commentary(&mut self, summary: &RunSummary) -> Result<String, ClientError> {
        let line = match (summary.score, summary.kills) {
            (0, 0) => format!("{} barely left the spawn point.", summary.player_name),
            (_, 0) => format!(
                "{} grazed peacefully to {} points. Pacifism has its limits.",
                summary.player_name, summary.score
            ),
            (score, 1) => format!(
                "{} took one rival down on the way to {} points.",
                summary.player_name, score
            ),
            (score, kills) => format!(
                "{} left {} snakes in the dust and banked {} points.",
                summary.player_name, kills, score
            ),
        };
        Ok(line)
    }
}
