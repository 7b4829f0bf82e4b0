use crate::track::Track;

/// Start distance of every segment, in segment order.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoints {
    starts: Vec<f32>,
}

impl Checkpoints {
    pub fn from_track(track: &Track) -> Self {
        let mut starts = Vec::with_capacity(track.segments().len());
        let mut distance = 0.0;
        for segment in track.segments() {
            starts.push(distance);
            distance += segment.length;
        }
        Self { starts }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn start_of(&self, index: usize) -> Option<f32> {
        self.starts.get(index).copied()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.starts.len().checked_sub(1)
    }

    /// Index `i` with `distance` in `[cp[i], cp[i + 1])`; the last range wraps
    /// around to the first checkpoint.
    pub fn find_current(&self, distance: f32) -> Option<usize> {
        let last = self.last_index()?;

        for (i, window) in self.starts.windows(2).enumerate() {
            if distance >= window[0] && distance < window[1] {
                return Some(i);
            }
        }

        // anything else belongs to the closing range [cp[last], cp[0])
        Some(last)
    }
}
