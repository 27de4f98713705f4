use std::fmt;

use crate::error::CoreError;

/// Catégorie de sample prédite par le classifieur.
///
/// L'ordre des variantes est positionnel : il correspond aux sorties de la
/// dernière couche du réseau et ne doit jamais changer.
///
/// # Example
/// ```
/// use ss_core::ClassLabel;
/// assert_eq!(ClassLabel::from_index(0).unwrap(), ClassLabel::Drum);
/// assert_eq!(ClassLabel::Drum.dir_name(), "drum_samples");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassLabel {
    Drum,
    Synth,
    Voice,
    Water,
}

impl ClassLabel {
    /// All labels in output-layer order.
    pub const ALL: [Self; 4] = [Self::Drum, Self::Synth, Self::Voice, Self::Water];

    /// Number of classes produced by the network.
    pub const COUNT: usize = Self::ALL.len();

    /// Map an arg-max index back to a label.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidClassIndex` if `index >= 4`.
    pub fn from_index(index: usize) -> Result<Self, CoreError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(CoreError::InvalidClassIndex {
                index,
                count: Self::COUNT,
            })
    }

    /// Position of the label in the output layer.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Drum => 0,
            Self::Synth => 1,
            Self::Voice => 2,
            Self::Water => 3,
        }
    }

    /// Nom du sous-dossier de destination.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Drum => "drum_samples",
            Self::Synth => "synth_samples",
            Self::Voice => "voice_samples",
            Self::Water => "water_samples",
        }
    }

    /// Reverse lookup from a directory name.
    #[must_use]
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.dir_name() == name)
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
