//! Dosha weights and barycentric fractions
//!
//! `DoshaWeights` is what callers hand in and read back (nominally
//! percentages). `Barycentric` is the normalized form both projection
//! directions compute with.

use serde::{Deserialize, Serialize};

/// One of the three weighted categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    /// Display order used by the readout
    pub const ALL: [Dosha; 3] = [Dosha::Vata, Dosha::Pitta, Dosha::Kapha];

    pub fn name(&self) -> &'static str {
        match self {
            Dosha::Vata => "Vata",
            Dosha::Pitta => "Pitta",
            Dosha::Kapha => "Kapha",
        }
    }

    /// Element shown next to the name on vertex labels
    pub fn element(&self) -> &'static str {
        match self {
            Dosha::Vata => "Air",
            Dosha::Pitta => "Fire",
            Dosha::Kapha => "Earth",
        }
    }
}

/// Three dosha weights, nominally percentages in `[0, 100]`
///
/// Inputs need not sum to 100; projections normalize by the total.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DoshaWeights {
    pub vata: f64,
    pub pitta: f64,
    pub kapha: f64,
}

impl DoshaWeights {
    pub const fn new(vata: f64, pitta: f64, kapha: f64) -> Self {
        Self { vata, pitta, kapha }
    }

    pub fn get(&self, dosha: Dosha) -> f64 {
        match dosha {
            Dosha::Vata => self.vata,
            Dosha::Pitta => self.pitta,
            Dosha::Kapha => self.kapha,
        }
    }

    pub fn total(&self) -> f64 {
        self.vata + self.pitta + self.kapha
    }

    /// Normalized fractions
    ///
    /// `None` when the total cannot be a denominator, or when cancelling
    /// weights leave a total so small that a fraction overflows.
    pub fn normalized(&self) -> Option<Barycentric> {
        let total = self.total();
        if total == 0.0 || !total.is_finite() {
            return None;
        }
        let bary = Barycentric {
            vata: self.vata / total,
            pitta: self.pitta / total,
            kapha: self.kapha / total,
        };
        bary.is_finite().then_some(bary)
    }
}

/// Barycentric fractions keyed by dosha
///
/// Inside the closed triangle every component is in `[0, 1]` and they sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    pub vata: f64,
    pub pitta: f64,
    pub kapha: f64,
}

impl Barycentric {
    pub const EQUAL_THIRDS: Barycentric = Barycentric {
        vata: 1.0 / 3.0,
        pitta: 1.0 / 3.0,
        kapha: 1.0 / 3.0,
    };

    pub fn get(&self, dosha: Dosha) -> f64 {
        match dosha {
            Dosha::Vata => self.vata,
            Dosha::Pitta => self.pitta,
            Dosha::Kapha => self.kapha,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.vata.is_finite() && self.pitta.is_finite() && self.kapha.is_finite()
    }

    pub fn sum(&self) -> f64 {
        self.vata + self.pitta + self.kapha
    }

    /// True when every component is in `[0, 1]` (with tolerance) and they sum to 1
    pub fn is_inside(&self, tolerance: f64) -> bool {
        Dosha::ALL
            .iter()
            .map(|d| self.get(*d))
            .all(|v| v >= -tolerance && v <= 1.0 + tolerance)
            && (self.sum() - 1.0).abs() <= tolerance
    }
}
