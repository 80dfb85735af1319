//! Decoded-show validation
//!
//! Produces informational warnings over a decoded show. Overlap detection
//! is a sweep over events sorted by (start time, original index): events
//! whose end time has passed are pruned from the active set, and a pair of
//! active events only warns when their prop masks could actually collide.

use std::fmt;

use serde::Serialize;

use super::constants::{PROP_COUNT, SHOW_VERSION};
use super::decoder::DecodedShow;
use super::mask::PropMask;

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationWarning {
    /// Format version other than the current one
    NonStandardVersion { version: u16 },

    /// Two events share a time window and may target the same props
    Overlap {
        first: usize,
        second: usize,
        start_ms: u32,
        end_ms: u32,
        /// Shared prop count when both masks are known (non-empty)
        shared_props: Option<u32>,
    },

    /// Event with a zero-length window
    ZeroDuration { index: usize },

    /// Event targeting no props at all
    NoTargets { index: usize },

    /// Prop targeted by events but configured with zero LEDs
    UnconfiguredProp { prop_id: u32 },

    /// Header declared more events than the buffer contained
    TruncatedEvents { declared: u16, parsed: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::NonStandardVersion { version } => {
                write!(f, "format version {version} is not the current version {SHOW_VERSION}")
            }
            ValidationWarning::Overlap {
                first,
                second,
                start_ms,
                end_ms,
                shared_props,
            } => {
                write!(f, "events {first} and {second} overlap in [{start_ms}ms, {end_ms}ms)")?;
                if let Some(shared) = shared_props {
                    write!(f, " sharing {shared} props")?;
                }
                Ok(())
            }
            ValidationWarning::ZeroDuration { index } => {
                write!(f, "event {index} has zero duration")
            }
            ValidationWarning::NoTargets { index } => {
                write!(f, "event {index} targets no props")
            }
            ValidationWarning::UnconfiguredProp { prop_id } => {
                write!(f, "prop {prop_id} is targeted by events but has zero configured LEDs")
            }
            ValidationWarning::TruncatedEvents { declared, parsed } => {
                write!(f, "header declared {declared} events but only {parsed} were present")
            }
        }
    }
}

/// Validate a decoded show, returning all findings
pub fn validate(show: &DecodedShow) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if show.version != SHOW_VERSION {
        warnings.push(ValidationWarning::NonStandardVersion {
            version: show.version,
        });
    }
    if show.declared_events as usize > show.events.len() {
        warnings.push(ValidationWarning::TruncatedEvents {
            declared: show.declared_events,
            parsed: show.events.len(),
        });
    }

    // Sweep-line conflict detection over (start, original index) order
    let mut order: Vec<usize> = (0..show.events.len()).collect();
    order.sort_by_key(|&i| (show.events[i].start_ms, i));

    let mut active: Vec<usize> = Vec::new();
    for &index in &order {
        let event = &show.events[index];
        active.retain(|&a| show.events[a].end_ms() > event.start_ms);

        for &other in &active {
            let other_event = &show.events[other];
            let both_known = !event.mask.is_empty() && !other_event.mask.is_empty();
            if both_known && !event.mask.intersects(&other_event.mask) {
                // Disjoint props may legitimately share a time window
                continue;
            }
            warnings.push(ValidationWarning::Overlap {
                first: other,
                second: index,
                start_ms: event.start_ms,
                end_ms: event.end_ms().min(other_event.end_ms()),
                shared_props: if both_known {
                    Some(event.mask.intersection(&other_event.mask).count())
                } else {
                    None
                },
            });
        }
        active.push(index);
    }

    let mut targeted = PropMask::new();
    for (index, event) in show.events.iter().enumerate() {
        if event.duration_ms == 0 {
            warnings.push(ValidationWarning::ZeroDuration { index });
        }
        if event.mask.is_empty() {
            warnings.push(ValidationWarning::NoTargets { index });
        }
        for (i, word) in targeted.0.iter_mut().enumerate() {
            *word |= event.mask.0[i];
        }
    }

    // Only props covered by the parsed LUT can be judged
    for prop_id in 1..=PROP_COUNT as u32 {
        let config_index = (prop_id - 1) as usize;
        if config_index >= show.configs.len() {
            break;
        }
        if targeted.contains(prop_id) && show.configs[config_index].led_count == 0 {
            warnings.push(ValidationWarning::UnconfiguredProp { prop_id });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::super::decoder::{DecodedEvent, DecodedShow, PropConfig, ShowSummary};
    use super::super::mask::PropMask;
    use super::{ValidationWarning, validate};

    fn event(start_ms: u32, duration_ms: u32, props: &[u32]) -> DecodedEvent {
        let mask = PropMask::from_ids(props.iter().copied());
        DecodedEvent {
            start_ms,
            duration_ms,
            effect: 1,
            speed: 50,
            width: 0,
            color1: 0,
            color2: 0,
            prop_count: mask.count(),
            mask,
        }
    }

    fn show(events: Vec<DecodedEvent>) -> DecodedShow {
        let total = events.len();
        DecodedShow {
            version: 3,
            declared_events: total as u16,
            configs: vec![
                PropConfig {
                    led_count: 164,
                    led_type: 0,
                    color_order: 0,
                    brightness: 255,
                };
                224
            ],
            events,
            cues: None,
            summary: ShowSummary {
                total_events: total,
                max_end_ms: 0,
                configured_props: 224,
                file_size: 0,
            },
        }
    }

    #[test]
    fn test_disjoint_masks_do_not_warn() {
        let warnings = validate(&show(vec![
            event(0, 1000, &[1, 2]),
            event(500, 1000, &[3, 4]),
        ]));
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_intersecting_masks_warn_with_shared_count() {
        let warnings = validate(&show(vec![
            event(0, 1000, &[1, 2, 3]),
            event(600, 1000, &[3, 2, 9]),
        ]));
        assert_eq!(
            warnings,
            vec![ValidationWarning::Overlap {
                first: 0,
                second: 1,
                start_ms: 600,
                end_ms: 1000,
                shared_props: Some(2),
            }]
        );
    }

    #[test]
    fn test_touching_windows_do_not_overlap() {
        // Second event starts exactly when the first ends
        let warnings = validate(&show(vec![
            event(0, 1000, &[1]),
            event(1000, 1000, &[1]),
        ]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_mask_overlap_has_no_shared_count() {
        let warnings = validate(&show(vec![event(0, 1000, &[]), event(500, 1000, &[1])]));
        assert!(warnings.contains(&ValidationWarning::Overlap {
            first: 0,
            second: 1,
            start_ms: 500,
            end_ms: 1000,
            shared_props: None,
        }));
        assert!(warnings.contains(&ValidationWarning::NoTargets { index: 0 }));
    }

    #[test]
    fn test_zero_duration_and_unconfigured_prop() {
        let mut s = show(vec![event(100, 0, &[5])]);
        s.configs[4].led_count = 0;
        let warnings = validate(&s);
        assert!(warnings.contains(&ValidationWarning::ZeroDuration { index: 0 }));
        assert!(warnings.contains(&ValidationWarning::UnconfiguredProp { prop_id: 5 }));
    }

    #[test]
    fn test_version_and_truncation_warnings() {
        let mut s = show(vec![event(0, 100, &[1])]);
        s.version = 2;
        s.declared_events = 9;
        let warnings = validate(&s);
        assert!(warnings.contains(&ValidationWarning::NonStandardVersion { version: 2 }));
        assert!(warnings.contains(&ValidationWarning::TruncatedEvents {
            declared: 9,
            parsed: 1,
        }));
    }
}
