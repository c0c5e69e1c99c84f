//! Layer containers for the sparse field.

/// Layer labels stored per vertex.
///
/// The five band labels match the layer a vertex belongs to. Vertices
/// outside the band carry [`point_type::OUTSIDE`] or [`point_type::INSIDE`].
pub mod point_type {
    /// Zero level: the contour itself.
    pub const ZERO: i8 = 0;
    /// First band outside the contour.
    pub const PLUS1: i8 = 1;
    /// First band inside the contour.
    pub const MINUS1: i8 = -1;
    /// Second band outside the contour.
    pub const PLUS2: i8 = 2;
    /// Second band inside the contour.
    pub const MINUS2: i8 = -2;
    /// Outside, beyond the band.
    pub const OUTSIDE: i8 = 3;
    /// Inside, beyond the band.
    pub const INSIDE: i8 = -3;
}

/// A set of vertex indices kept sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSet {
    items: Vec<u32>,
}

impl LayerSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from indices in any order, dropping duplicates.
    pub fn from_unsorted(mut items: Vec<u32>) -> Self {
        items.sort_unstable();
        items.dedup();
        Self { items }
    }

    /// Insert `v`, keeping the set ordered.
    pub fn insert(&mut self, v: u32) -> bool {
        match self.items.binary_search(&v) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, v);
                true
            }
        }
    }

    /// Whether `v` is a member.
    #[inline]
    pub fn contains(&self, v: u32) -> bool {
        self.items.binary_search(&v).is_ok()
    }

    /// Number of vertices in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Members in ascending order.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.items
    }

    /// Iterate members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.items.iter().copied()
    }

    /// Whether the two sets share no vertex.
    pub fn is_disjoint(&self, other: &LayerSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.items.len() && j < other.items.len() {
            match self.items[i].cmp(&other.items[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return false,
            }
        }
        true
    }
}

impl FromIterator<u32> for LayerSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

/// The five layers of the narrow band.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layers {
    /// `L_z`: the contour.
    pub zero: LayerSet,
    /// `L_p1`: first outside band.
    pub plus1: LayerSet,
    /// `L_n1`: first inside band.
    pub minus1: LayerSet,
    /// `L_p2`: second outside band.
    pub plus2: LayerSet,
    /// `L_n2`: second inside band.
    pub minus2: LayerSet,
}

impl Layers {
    /// Layer holding vertices with the given band label.
    pub fn get(&self, label: i8) -> Option<&LayerSet> {
        match label {
            point_type::ZERO => Some(&self.zero),
            point_type::PLUS1 => Some(&self.plus1),
            point_type::MINUS1 => Some(&self.minus1),
            point_type::PLUS2 => Some(&self.plus2),
            point_type::MINUS2 => Some(&self.minus2),
            _ => None,
        }
    }

    /// `(label, layer)` pairs from the contour outward.
    pub fn labeled(&self) -> [(i8, &LayerSet); 5] {
        [
            (point_type::ZERO, &self.zero),
            (point_type::PLUS1, &self.plus1),
            (point_type::MINUS1, &self.minus1),
            (point_type::PLUS2, &self.plus2),
            (point_type::MINUS2, &self.minus2),
        ]
    }

    /// Vertices in the whole band.
    pub fn band_size(&self) -> usize {
        self.labeled().iter().map(|(_, layer)| layer.len()).sum()
    }

    /// Whether no vertex belongs to two layers.
    pub fn is_partition(&self) -> bool {
        let all = self.labeled();
        all.iter().enumerate().all(|(i, (_, a))| {
            all[i + 1..].iter().all(|(_, b)| a.is_disjoint(b))
        })
    }
}
