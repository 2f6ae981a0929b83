// Pitch-class extraction from Standard MIDI Files.
//
// Every note-on with nonzero velocity contributes one observation, its key
// number modulo 12. A note-on with velocity 0 is a note-off by MIDI
// convention and is skipped. Durations, channels and velocities are
// otherwise ignored.
//
// Parallel (format 1) and single-track files are merged into one stream by
// absolute tick; events on the same tick keep track order, then file order.
// Sequential (format 2) files hold independent patterns, so their tracks are
// concatenated instead.
//
// Uses the `midly` crate for parsing.

use crate::error::{CliError, Result};
use midly::{Format, MidiMessage, Smf, TrackEventKind};
use std::path::Path;
use tracing::debug;

/// Read a MIDI file and return its note-on pitch classes in playing order.
pub fn read_pitch_classes(path: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(path).map_err(|e| CliError::midi(path, e))?;
    let smf = Smf::parse(&data).map_err(|e| CliError::midi(path, e))?;
    let pitch_classes = pitch_classes_from_smf(&smf);
    debug!(
        path = %path.display(),
        tracks = smf.tracks.len(),
        notes = pitch_classes.len(),
        "parsed MIDI file"
    );
    if pitch_classes.is_empty() {
        return Err(CliError::NoNotes(path.to_path_buf()));
    }
    Ok(pitch_classes)
}

/// Note-on pitch classes of an already parsed file.
pub fn pitch_classes_from_smf(smf: &Smf<'_>) -> Vec<u8> {
    // (absolute tick, track, position in track, pitch class)
    let mut notes: Vec<(u64, usize, usize, u8)> = Vec::new();
    let mut track_offset: u64 = 0;

    for (ti, track) in smf.tracks.iter().enumerate() {
        let mut tick = track_offset;
        for (ei, event) in track.iter().enumerate() {
            tick += u64::from(event.delta.as_int());
            if let TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } = event.kind
                && vel.as_int() > 0
            {
                notes.push((tick, ti, ei, key.as_int() % 12));
            }
        }
        if smf.header.format == Format::Sequential {
            track_offset = tick;
        }
    }

    notes.sort_by_key(|&(tick, ti, ei, _)| (tick, ti, ei));
    notes.into_iter().map(|(_, _, _, pc)| pc).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u4, u7, u15, u28};
    use midly::{Header, MetaMessage, Timing, Track, TrackEvent};

    fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            },
        }
    }

    fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
        }
    }

    fn end_of_track() -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    fn smf(format: Format, tracks: Vec<Track<'static>>) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(format, Timing::Metrical(u15::new(480))));
        smf.tracks = tracks;
        smf
    }

    #[test]
    fn test_zero_velocity_note_on_is_skipped() {
        let track = vec![
            note_on(0, 60, 80),
            note_on(240, 60, 0),
            note_on(0, 64, 80),
            note_off(240, 64),
            note_on(0, 67, 1),
            end_of_track(),
        ];
        let pcs = pitch_classes_from_smf(&smf(Format::SingleTrack, vec![track]));
        assert_eq!(pcs, vec![0, 4, 7]);
    }

    #[test]
    fn test_key_reduced_modulo_twelve() {
        let track = vec![note_on(0, 21, 90), note_on(10, 127, 90), note_on(10, 0, 90)];
        let pcs = pitch_classes_from_smf(&smf(Format::SingleTrack, vec![track]));
        assert_eq!(pcs, vec![9, 7, 0]);
    }

    #[test]
    fn test_parallel_tracks_merge_by_tick() {
        // Track 0 plays at ticks 0 and 480, track 1 at 240 and 480.
        let melody = vec![note_on(0, 60, 80), note_on(480, 62, 80), end_of_track()];
        let bass = vec![note_on(240, 43, 80), note_on(240, 48, 80), end_of_track()];
        let pcs = pitch_classes_from_smf(&smf(Format::Parallel, vec![melody, bass]));
        // Equal ticks keep track order: track 0's D before track 1's C.
        assert_eq!(pcs, vec![0, 7, 2, 0]);
    }

    #[test]
    fn test_sequential_tracks_concatenate() {
        let first = vec![note_on(0, 60, 80), note_on(480, 64, 80), end_of_track()];
        let second = vec![note_on(0, 67, 80), end_of_track()];
        let pcs = pitch_classes_from_smf(&smf(Format::Sequential, vec![first, second]));
        assert_eq!(pcs, vec![0, 4, 7]);
    }

    #[test]
    fn test_read_rejects_garbage_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();

        let garbage = dir.path().join("garbage.mid");
        std::fs::write(&garbage, b"definitely not a midi file").unwrap();
        assert!(matches!(
            read_pitch_classes(&garbage),
            Err(CliError::Midi { .. })
        ));

        let silent = dir.path().join("silent.mid");
        let mut buf = Vec::new();
        smf(Format::SingleTrack, vec![vec![end_of_track()]])
            .write(&mut buf)
            .unwrap();
        std::fs::write(&silent, &buf).unwrap();
        assert!(matches!(
            read_pitch_classes(&silent),
            Err(CliError::NoNotes(_))
        ));

        assert!(matches!(
            read_pitch_classes(&dir.path().join("absent.mid")),
            Err(CliError::Midi { .. })
        ));
    }

    #[test]
    fn test_read_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scale.mid");
        let track: Track<'static> = [60u8, 62, 64, 65, 67]
            .iter()
            .map(|&k| note_on(120, k, 64))
            .chain(std::iter::once(end_of_track()))
            .collect();
        let mut buf = Vec::new();
        smf(Format::SingleTrack, vec![track]).write(&mut buf).unwrap();
        std::fs::write(&path, &buf).unwrap();
        assert_eq!(read_pitch_classes(&path).unwrap(), vec![0, 2, 4, 5, 7]);
    }
}
