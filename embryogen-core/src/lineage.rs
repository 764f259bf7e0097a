//! The lineage recorder (§4.7): a keyed collection of CTC-style track
//! records, grounded in the original `TrackRecords_CTC` map.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackRecord {
    pub id: i64,
    pub from_frame: i64,
    pub to_frame: i64,
    pub parent_id: i64,
}

impl TrackRecord {
    fn new(id: i64, from_frame: i64, parent_id: i64) -> Self {
        TrackRecord {
            id,
            from_frame,
            to_frame: -1,
            parent_id,
        }
    }

    /// A track whose `toFrame` never caught up to its `fromFrame` was
    /// never actually displayed and is omitted on export.
    fn was_ever_displayed(&self) -> bool {
        self.to_frame >= self.from_frame
    }
}

#[derive(Debug, Default, Clone)]
pub struct LineageRecorder {
    tracks: BTreeMap<i64, TrackRecord>,
}

impl LineageRecorder {
    pub fn new() -> Self {
        LineageRecorder::default()
    }

    pub fn start_new_track(&mut self, id: i64, frame: i64) {
        self.tracks.insert(id, TrackRecord::new(id, frame, 0));
    }

    /// Closes `id` at `frame`; warns (does not panic) if the track was
    /// already closed, per §7's "closing an already-closed track is a
    /// warning, not an error".
    pub fn close_track(&mut self, id: i64, frame: i64) {
        match self.tracks.get_mut(&id) {
            Some(t) => {
                if t.to_frame >= t.from_frame {
                    warn!(track = id, "closing an already-closed track");
                }
                t.to_frame = frame;
            }
            None => warn!(track = id, "closing an unknown track"),
        }
    }

    /// §4.5: atomic division bookkeeping — closes the mother at
    /// `frame - 1` and starts both daughters at `frame`.
    pub fn report_new_born_daughters(&mut self, mother_id: i64, daughter_a: i64, daughter_b: i64, frame: i64) {
        self.close_track(mother_id, frame - 1);
        self.tracks.insert(daughter_a, TrackRecord::new(daughter_a, frame, mother_id));
        self.tracks.insert(daughter_b, TrackRecord::new(daughter_b, frame, mother_id));
    }

    pub fn update_parental_link(&mut self, child_id: i64, parent_id: i64, current_frame: i64) {
        self.tracks
            .insert(child_id, TrackRecord::new(child_id, current_frame, parent_id));
    }

    /// Closes every still-open track at `current_frame - 1`, as done
    /// during Director shutdown.
    pub fn close_all_open_tracks(&mut self, current_frame: i64) {
        for t in self.tracks.values_mut() {
            if t.to_frame < t.from_frame {
                t.to_frame = current_frame - 1;
            }
        }
    }

    pub fn tracks(&self) -> impl Iterator<Item = &TrackRecord> {
        self.tracks.values()
    }

    /// Writes `id fromFrame toFrame parentId` lines, LF-terminated,
    /// skipping tracks never displayed.
    pub fn export_all(&self, path: &Path) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        for t in self.tracks.values() {
            if !t.was_ever_displayed() {
                continue;
            }
            writeln!(file, "{} {} {} {}", t.id, t.from_frame, t.to_frame, t.parent_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_closes_mother_and_opens_daughters() {
        let mut l = LineageRecorder::new();
        l.start_new_track(1, 0);
        l.report_new_born_daughters(1, 2, 3, 10);

        let mother = l.tracks.get(&1).unwrap();
        assert_eq!(mother.to_frame, 9);
        let a = l.tracks.get(&2).unwrap();
        assert_eq!(a.parent_id, 1);
        assert_eq!(a.from_frame, 10);
    }

    #[test]
    fn export_skips_never_displayed_tracks() {
        let mut l = LineageRecorder::new();
        l.start_new_track(1, 0);
        l.close_track(1, 5);
        l.start_new_track(2, 3); // never closed/displayed before export

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.txt");
        l.export_all(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1 0 5 0\n");
    }

    #[test]
    fn close_all_open_tracks_uses_previous_frame() {
        let mut l = LineageRecorder::new();
        l.start_new_track(1, 0);
        l.close_all_open_tracks(8);
        assert_eq!(l.tracks.get(&1).unwrap().to_frame, 7);
    }
}
