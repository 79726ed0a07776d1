use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Default number of layers a container holds.
pub const DEFAULT_CAPACITY: usize = 4;

/// The fixed color catalog. Order is the canonical catalog order used by
/// seeded color selection and by the rainbow layout.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Cyan,
    Pink,
    Brown,
    Lime,
    Magenta,
    Indigo,
    Maroon,
    Navy,
    Olive,
    Teal,
    Silver,
    Coral,
    Crimson,
    Gold,
    Plum,
    Turquoise,
}

impl Color {
    pub const ALL: [Color; 22] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
        Color::Cyan,
        Color::Pink,
        Color::Brown,
        Color::Lime,
        Color::Magenta,
        Color::Indigo,
        Color::Maroon,
        Color::Navy,
        Color::Olive,
        Color::Teal,
        Color::Silver,
        Color::Coral,
        Color::Crimson,
        Color::Gold,
        Color::Plum,
        Color::Turquoise,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Color> {
        Self::ALL.get(id).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
            Color::Cyan => "cyan",
            Color::Pink => "pink",
            Color::Brown => "brown",
            Color::Lime => "lime",
            Color::Magenta => "magenta",
            Color::Indigo => "indigo",
            Color::Maroon => "maroon",
            Color::Navy => "navy",
            Color::Olive => "olive",
            Color::Teal => "teal",
            Color::Silver => "silver",
            Color::Coral => "coral",
            Color::Crimson => "crimson",
            Color::Gold => "gold",
            Color::Plum => "plum",
            Color::Turquoise => "turquoise",
        }
    }

    /// Single letter label, A for the first catalog entry.
    pub fn letter(self) -> char {
        (b'A' + self.id() as u8) as char
    }

    pub fn from_letter(ch: char) -> Option<Color> {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let up = ch.to_ascii_uppercase();
        Self::from_id((up as u8 - b'A') as usize)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bounded stack of colored layers. The last element is the top.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Container {
    layers: Vec<Color>,
    capacity: usize,
}

impl Container {
    pub fn new(capacity: usize) -> Self {
        Self {
            layers: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a container from bottom-to-top layers. Layers past `capacity`
    /// are dropped.
    pub fn with_layers(capacity: usize, layers: impl IntoIterator<Item = Color>) -> Self {
        let mut container = Self::new(capacity);
        for color in layers {
            if !container.push(color) {
                break;
            }
        }
        container
    }

    /// Pushes a layer regardless of the top color. Returns false when full.
    pub fn push(&mut self, color: Color) -> bool {
        if self.is_full() {
            return false;
        }
        self.layers.push(color);
        true
    }

    pub fn pop(&mut self) -> Option<Color> {
        self.layers.pop()
    }

    /// Removes the bottom-most layer of `color`.
    pub fn remove_lowest(&mut self, color: Color) -> bool {
        match self.layers.iter().position(|c| *c == color) {
            Some(index) => {
                self.layers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Swaps the top layer with the highest layer of `color` below it.
    pub(crate) fn raise_to_top(&mut self, color: Color) -> bool {
        let Some(top) = self.layers.len().checked_sub(1) else {
            return false;
        };
        match self.layers.iter().rposition(|c| *c == color) {
            Some(index) => {
                self.layers.swap(index, top);
                true
            }
            None => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.layers.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_empty_space(&self) -> usize {
        self.capacity.saturating_sub(self.layers.len())
    }

    pub fn get_top_color(&self) -> Option<Color> {
        self.layers.last().copied()
    }

    pub fn get_layers(&self) -> &[Color] {
        &self.layers
    }

    /// Per-color layer counts in order of first appearance from the bottom.
    pub fn color_counts(&self) -> Vec<(Color, usize)> {
        let mut counts: Vec<(Color, usize)> = Vec::new();
        for color in &self.layers {
            match counts.iter_mut().find(|(c, _)| c == color) {
                Some((_, count)) => *count += 1,
                None => counts.push((*color, 1)),
            }
        }
        counts
    }

    pub fn distinct_colors(&self) -> usize {
        self.color_counts().len()
    }

    /// Full and a single color.
    pub fn is_complete(&self) -> bool {
        self.is_full() && self.layers.windows(2).all(|w| w[0] == w[1])
    }

    pub fn get_text_representation(&self) -> String {
        let mut repr: String = self.layers.iter().map(|c| c.letter()).collect();
        repr.extend(std::iter::repeat_n('.', self.get_empty_space()));
        repr
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLayoutError {
    #[error("layout text contains no containers")]
    Empty,
    #[error("unknown color label {label:?} in container {container}")]
    UnknownColor { container: usize, label: char },
    #[error("container {container} has a layer above a free slot")]
    LayerAboveGap { container: usize },
}

/// Ordered set of containers making up one puzzle position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Layout {
    containers: Vec<Container>,
}

impl Layout {
    pub fn new(containers: Vec<Container>) -> Self {
        Self { containers }
    }

    /// Convenience constructor with a shared capacity.
    pub fn from_colors(capacity: usize, containers: &[&[Color]]) -> Self {
        Self::new(
            containers
                .iter()
                .map(|layers| Container::with_layers(capacity, layers.iter().copied()))
                .collect(),
        )
    }

    pub fn get_containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn containers_mut(&mut self) -> &mut [Container] {
        &mut self.containers
    }

    pub fn container(&self, index: usize) -> Option<&Container> {
        self.containers.get(index)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn empty_container_count(&self) -> usize {
        self.containers.iter().filter(|c| c.is_empty()).count()
    }

    /// Total layers of `color` across every container.
    pub fn count_color(&self, color: Color) -> usize {
        self.containers
            .iter()
            .map(|c| c.get_layers().iter().filter(|l| **l == color).count())
            .sum()
    }

    /// Colors present in the layout, in catalog order.
    pub fn colors(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self
            .containers
            .iter()
            .flat_map(|c| c.get_layers().iter().copied())
            .collect();
        colors.sort();
        colors.dedup();
        colors
    }

    /// Two distinct mutable containers.
    pub(crate) fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Container, &mut Container)> {
        if a == b || a >= self.containers.len() || b >= self.containers.len() {
            return None;
        }
        if a < b {
            let (left, right) = self.containers.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.containers.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }

    pub fn get_text_representation(&self) -> String {
        self.containers
            .iter()
            .map(|c| c.get_text_representation())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_text_representation())
    }
}

impl FromStr for Layout {
    type Err = ParseLayoutError;

    /// One container per non-blank line, bottom first; `.` marks a free slot
    /// and the line length is the capacity.
    fn from_str(repr: &str) -> Result<Self, Self::Err> {
        let mut containers = Vec::new();
        for (index, line) in repr.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let mut layers = Vec::new();
            let mut saw_gap = false;
            for ch in line.chars() {
                if ch == '.' {
                    saw_gap = true;
                    continue;
                }
                if saw_gap {
                    return Err(ParseLayoutError::LayerAboveGap { container: index });
                }
                let color = Color::from_letter(ch)
                    .ok_or(ParseLayoutError::UnknownColor { container: index, label: ch })?;
                layers.push(color);
            }
            let capacity = line.chars().count();
            containers.push(Container::with_layers(capacity, layers));
        }
        if containers.is_empty() {
            return Err(ParseLayoutError::Empty);
        }
        Ok(Layout::new(containers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Color::*;

    #[test]
    fn push_respects_capacity() {
        let mut container = Container::new(2);
        assert!(container.push(Red));
        assert!(container.push(Blue));
        assert!(!container.push(Green));
        assert_eq!(container.get_layers(), &[Red, Blue]);
        assert_eq!(container.get_empty_space(), 0);
    }

    #[test]
    fn color_counts_follow_first_appearance() {
        let container = Container::with_layers(4, [Blue, Red, Blue, Green]);
        assert_eq!(container.color_counts(), vec![(Blue, 2), (Red, 1), (Green, 1)]);
        assert_eq!(container.distinct_colors(), 3);
    }

    #[test]
    fn raise_to_top_swaps_highest_match() {
        let mut container = Container::with_layers(4, [Red, Blue, Red, Green]);
        assert!(container.raise_to_top(Red));
        assert_eq!(container.get_layers(), &[Red, Blue, Green, Red]);
        assert!(!container.raise_to_top(Yellow));
    }

    #[test]
    fn text_representation_parses_back() {
        let layout = Layout::from_colors(4, &[&[Red, Blue], &[Blue, Red, Red, Red], &[]]);
        let text = layout.get_text_representation();
        assert_eq!(text, "AB..\nBAAA\n....");
        assert_eq!(text.parse::<Layout>(), Ok(layout));
    }

    #[test]
    fn parse_rejects_layers_above_gap() {
        assert_eq!(
            "A.B.".parse::<Layout>(),
            Err(ParseLayoutError::LayerAboveGap { container: 0 })
        );
        assert_eq!(
            "AB..\nA?..".parse::<Layout>(),
            Err(ParseLayoutError::UnknownColor { container: 1, label: '?' })
        );
        assert_eq!("\n \n".parse::<Layout>(), Err(ParseLayoutError::Empty));
    }

    #[test]
    fn letters_cover_catalog() {
        for color in Color::ALL {
            assert_eq!(Color::from_letter(color.letter()), Some(color));
        }
        assert_eq!(Color::from_letter('Z'), None);
    }
}
