//! Folder names carry the experiment parameters, because each shot was taken
//! by hand into its own subfolder. The naming grew organically on the lab
//! computers, so parsing is deliberately loose: anything that does not match a
//! known shape is Unknown and the scanners skip it.

use std::path::Path;

/// What a data subfolder holds, recovered from its name.
#[derive(Debug, Clone, PartialEq)]
pub enum FolderLabel {
    /// A `background` folder; frames are reference images without atoms
    Background,
    /// A Zeeman-slower folder; shown as "MOT" by the visualizer, skipped by the
    /// lifetime fit
    Mot,
    /// A wait-time folder such as `2s_after_ramp_green_mot` or
    /// `1_2s_after_ramp_green_mot` (the latter reads as 1/2 s)
    WaitTime { seconds: f64, display: String },
    /// Anything else
    Unknown,
}

fn leading_digits(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

impl FolderLabel {
    /// Parse a subfolder name.
    ///
    /// Keyword checks are case-insensitive and win over the numeric patterns,
    /// mirroring how folders were actually named during data taking.
    pub fn parse(folder_name: &str) -> Self {
        let lower = folder_name.to_lowercase();
        if lower.contains("background") {
            return Self::Background;
        }
        if lower.contains("zeeman") {
            return Self::Mot;
        }

        let whole = leading_digits(folder_name);
        if whole.is_empty() {
            return Self::Unknown;
        }
        let numerator: f64 = match whole.parse() {
            Ok(v) => v,
            Err(_) => return Self::Unknown,
        };

        let rest = &folder_name[whole.len()..];
        if let Some(after_sep) = rest.strip_prefix('_') {
            let denom = leading_digits(after_sep);
            if !denom.is_empty() {
                // Fractional wait time written as numerator_denominator
                let denominator: f64 = match denom.parse() {
                    Ok(v) if v != 0.0 => v,
                    _ => return Self::Unknown,
                };
                return Self::WaitTime {
                    seconds: numerator / denominator,
                    display: format!("t={whole}/{denom}"),
                };
            }
        }

        Self::WaitTime {
            seconds: numerator,
            display: format!("t={whole}s"),
        }
    }

    /// Parse the final component of a folder path
    pub fn parse_path(path: &Path) -> Self {
        match path.file_name() {
            Some(name) => Self::parse(&name.to_string_lossy()),
            None => Self::Unknown,
        }
    }

    /// Title text for plots and overlays
    pub fn display(&self) -> String {
        match self {
            Self::Background => String::from("Background"),
            Self::Mot => String::from("MOT"),
            Self::WaitTime { display, .. } => display.clone(),
            Self::Unknown => String::from("Unknown"),
        }
    }

    /// Sort key for parameter-ordered series; non-numeric labels sort last
    pub fn sort_value(&self) -> f64 {
        match self {
            Self::WaitTime { seconds, .. } => *seconds,
            _ => f64::INFINITY,
        }
    }
}

/// Titling label for the time-of-flight video folders, which use a different
/// naming convention than the wait-time subfolders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RampLabel {
    LongImagingNoRamp,
    LongImagingWithRamp,
    /// `NoRamp_<n>V`, the VCA setpoint in volts
    NoRamp(u32),
    /// `WithRamp_<start>V_<end>V`
    WithRamp(u32, u32),
    Unknown,
}

fn parse_volts(s: &str) -> Option<(u32, &str)> {
    let digits = leading_digits(s);
    if digits.is_empty() {
        return None;
    }
    let rest = s[digits.len()..].strip_prefix('V')?;
    Some((digits.parse().ok()?, rest))
}

impl RampLabel {
    pub fn parse(folder_name: &str) -> Self {
        if folder_name.starts_with("LongImaging_NoRampOnGreen") {
            return Self::LongImagingNoRamp;
        }
        if folder_name.starts_with("LongImaging_WithRampOnGreen") {
            return Self::LongImagingWithRamp;
        }
        if let Some(rest) = folder_name.strip_prefix("NoRamp_") {
            if let Some((volts, _)) = parse_volts(rest) {
                return Self::NoRamp(volts);
            }
        }
        if let Some(rest) = folder_name.strip_prefix("WithRamp_") {
            if let Some((start, tail)) = parse_volts(rest) {
                if let Some(tail) = tail.strip_prefix('_') {
                    if let Some((end, _)) = parse_volts(tail) {
                        return Self::WithRamp(start, end);
                    }
                }
            }
        }
        Self::Unknown
    }

    pub fn display(&self) -> String {
        match self {
            Self::LongImagingNoRamp => String::from("No-Ramp Long Imaging"),
            Self::LongImagingWithRamp => String::from("Ramp Long Imaging"),
            Self::NoRamp(volts) => format!("No Ramp {volts}V VCA"),
            Self::WithRamp(start, end) => format!("With Ramp {start}V-{end}V"),
            Self::Unknown => String::from("Unknown Experiment"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_time_labels() {
        let label = FolderLabel::parse("2s_after_ramp_green_mot");
        assert_eq!(
            label,
            FolderLabel::WaitTime {
                seconds: 2.0,
                display: String::from("t=2s")
            }
        );

        let half = FolderLabel::parse("1_2s_after_ramp_green_mot");
        assert_eq!(
            half,
            FolderLabel::WaitTime {
                seconds: 0.5,
                display: String::from("t=1/2")
            }
        );
    }

    #[test]
    fn test_keyword_labels() {
        assert_eq!(FolderLabel::parse("Background_no_atoms"), FolderLabel::Background);
        assert_eq!(FolderLabel::parse("backgrounds1"), FolderLabel::Background);
        assert_eq!(FolderLabel::parse("zeeman_slower_on"), FolderLabel::Mot);
        assert_eq!(FolderLabel::parse("Zeeman"), FolderLabel::Mot);
    }

    #[test]
    fn test_unknown_labels() {
        assert_eq!(FolderLabel::parse("after_ramp_green_mot"), FolderLabel::Unknown);
        assert_eq!(FolderLabel::parse(""), FolderLabel::Unknown);
        assert_eq!(FolderLabel::parse("notes"), FolderLabel::Unknown);
    }

    #[test]
    fn test_sort_values() {
        assert_eq!(FolderLabel::parse("3s_mot").sort_value(), 3.0);
        assert_eq!(FolderLabel::parse("1_4s_mot").sort_value(), 0.25);
        assert!(FolderLabel::parse("zeeman").sort_value().is_infinite());
    }

    #[test]
    fn test_ramp_labels() {
        assert_eq!(RampLabel::parse("NoRamp_4V"), RampLabel::NoRamp(4));
        assert_eq!(RampLabel::parse("WithRamp_9V_6V"), RampLabel::WithRamp(9, 6));
        assert_eq!(
            RampLabel::parse("LongImaging_NoRampOnGreen_take2"),
            RampLabel::LongImagingNoRamp
        );
        assert_eq!(RampLabel::parse("807_65"), RampLabel::Unknown);
        assert_eq!(
            RampLabel::parse("WithRamp_9V_6V").display(),
            "With Ramp 9V-6V"
        );
        assert_eq!(RampLabel::parse("garbage").display(), "Unknown Experiment");
    }
}
