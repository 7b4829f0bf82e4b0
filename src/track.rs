// ==============================================================================
// track.rs — SEGMENTED CLOSED-LOOP TRACK
// ------------------------------------------------------------------------------
// A track is an ordered list of (curvature, length) segments forming a loop.
// Distances along the loop live in [0, total_distance); callers wrap first,
// lookups fall back to segment 0 when handed anything else.
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub curvature: f32, // signed, roughly -5..5
    pub length: f32,    // world units, > 0
}

impl Segment {
    pub const fn new(curvature: f32, length: f32) -> Self {
        Self { curvature, length }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackColors {
    pub road: &'static str,
    pub grass: &'static str,
    pub rumble: &'static str,
    pub lane: &'static str,
    pub sky: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadGeometry {
    pub width: f32,        // full road width, world units
    pub rumble_width: f32, // per side
    pub band_length: f32,  // distance covered by one projected band
    pub lanes: u32,
    pub colors: TrackColors,
}

pub const DEFAULT_COLORS: TrackColors = TrackColors {
    road: "#6B6B6B",
    grass: "#4A7023",
    rumble: "#FFFFFF",
    lane: "#CCCCCC",
    sky: "#72D7EE",
};

pub const DEFAULT_GEOMETRY: RoadGeometry = RoadGeometry {
    width: 2000.0,
    rumble_width: 300.0,
    band_length: 200.0,
    lanes: 3,
    colors: DEFAULT_COLORS,
};

pub const DEFAULT_SEGMENTS: [Segment; 8] = [
    Segment::new(0.0, 1000.0),
    Segment::new(2.0, 500.0),
    Segment::new(0.0, 500.0),
    Segment::new(-3.0, 600.0),
    Segment::new(1.0, 800.0),
    Segment::new(4.0, 400.0),
    Segment::new(-2.0, 600.0),
    Segment::new(0.0, 1200.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLookup {
    pub index: usize,
    pub local_percent: f32, // 0..1 progress through the segment
}

impl SegmentLookup {
    const FIRST: SegmentLookup = SegmentLookup {
        index: 0,
        local_percent: 0.0,
    };
}

#[derive(Debug, Clone)]
pub struct Track {
    segments: Vec<Segment>,
    total_distance: f32,
    geometry: RoadGeometry,
}

impl Track {
    pub fn new(segments: Vec<Segment>, geometry: RoadGeometry) -> Self {
        let total_distance = segments.iter().map(|s| s.length).sum();
        Self {
            segments,
            total_distance,
            geometry,
        }
    }

    /// The built-in 5600-unit loop.
    pub fn standard(lanes: u32) -> Self {
        Self::new(
            DEFAULT_SEGMENTS.to_vec(),
            RoadGeometry {
                lanes,
                ..DEFAULT_GEOMETRY
            },
        )
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    pub fn geometry(&self) -> &RoadGeometry {
        &self.geometry
    }

    /// Half-width available to a car of `car_width` before it leaves the road.
    pub fn lateral_bound(&self, car_width: f32) -> f32 {
        (self.geometry.width / 2.0 - car_width / 2.0).max(0.0)
    }

    pub fn segment_at(&self, distance: f32) -> SegmentLookup {
        if !(distance >= 0.0 && distance < self.total_distance) {
            return SegmentLookup::FIRST;
        }

        let mut start = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            let end = start + segment.length;
            if end > distance {
                return SegmentLookup {
                    index,
                    local_percent: (distance - start) / segment.length,
                };
            }
            start = end;
        }

        SegmentLookup::FIRST
    }

    pub fn curvature_at(&self, distance: f32) -> f32 {
        let lookup = self.segment_at(distance);
        self.segments
            .get(lookup.index)
            .map(|s| s.curvature)
            .unwrap_or(0.0)
    }

    /// Map any finite distance onto the loop.
    pub fn wrap(&self, distance: f32) -> f32 {
        if !(self.total_distance > 0.0) || !distance.is_finite() {
            return 0.0;
        }
        let wrapped = distance.rem_euclid(self.total_distance);
        // rem_euclid can round up to exactly `total` for tiny negatives
        if wrapped >= self.total_distance {
            0.0
        } else {
            wrapped
        }
    }
}
