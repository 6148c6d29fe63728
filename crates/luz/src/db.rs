use crate::Spectrum;

/// The maximum number of named spectra.
pub(crate) const SPECTRUM_DB_SIZE: usize = 384;

/// The maximum length of a spectrum name, in bytes.
const MAX_NAME_LEN: usize = 31;

/// A registry of named spectra.
///
/// The registry holds up to [`SPECTRUM_DB_SIZE`] entries with names of up to
/// 31 bytes; longer names are truncated. Once full, new names are silently
/// dropped; configuration processing is best effort throughout, and callers
/// observe the loss only as a failed lookup.
///
/// The dedicated engine spectra (`illuminant`, `substrate`, `observer_x`,
/// `observer_y`, `observer_z`) are *not* stored here; the engine routes
/// those names to its own slots before consulting the registry.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpectrumDb {
    entries: Vec<(String, Spectrum)>,
}

impl SpectrumDb {
    /// Look up a spectrum by name.
    pub fn get(&self, name: &str) -> Option<&Spectrum> {
        let name = clip_name(name);
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, spectrum)| spectrum)
    }

    /// Store a spectrum under the given name.
    ///
    /// Replaces the existing entry of the same name, if any.
    pub fn set(&mut self, name: &str, spectrum: Spectrum) {
        let name = clip_name(name);
        if let Some(entry) = self.entries.iter_mut().find(|(entry, _)| entry == name) {
            entry.1 = spectrum;
        } else if self.entries.len() < SPECTRUM_DB_SIZE {
            self.entries.push((name.to_string(), spectrum));
        }
    }

    /// Get the number of named spectra.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Clip a name to the maximum stored length at a character boundary.
fn clip_name(name: &str) -> &str {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
