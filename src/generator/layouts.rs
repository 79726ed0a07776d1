//! Placement strategies turning the layer multiset into containers.
//!
//! Every strategy draws from a [`LayerPool`] holding exactly `capacity`
//! layers of each selected color, so whatever the placement rule, each color
//! ends up as one full container's worth. Layers a strategy cannot place are
//! spread over the filled containers afterwards.

use macroquad::prelude::warn;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Color, Container, Layout};

use super::config::LevelConfig;
use super::pattern::Pattern;

/// Remaining layers per color, in a fixed color order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerPool {
    counts: Vec<(Color, usize)>,
}

impl LayerPool {
    pub fn new(colors: &[Color], per_color: usize) -> Self {
        Self {
            counts: colors.iter().map(|c| (*c, per_color)).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn take(&mut self, color: Color) -> bool {
        match self.counts.iter_mut().find(|(c, n)| *c == color && *n > 0) {
            Some((_, n)) => {
                *n -= 1;
                true
            }
            None => false,
        }
    }

    /// Takes the color at `index` (modulo the color count), or the next color
    /// after it that still has layers.
    pub fn take_nearest(&mut self, index: usize) -> Option<Color> {
        let len = self.counts.len();
        (0..len)
            .map(|k| (index + k) % len)
            .find(|i| self.counts[*i].1 > 0)
            .map(|i| {
                self.counts[i].1 -= 1;
                self.counts[i].0
            })
    }

    /// Moves half of every color (rounded down) into a new pool.
    pub fn split_half(&mut self) -> LayerPool {
        let counts = self
            .counts
            .iter_mut()
            .map(|(color, n)| {
                let half = *n / 2;
                *n -= half;
                (*color, half)
            })
            .collect();
        LayerPool { counts }
    }

    /// Empties the pool, returning its layers grouped by color.
    pub fn drain(&mut self) -> Vec<Color> {
        let layers = self.flatten();
        for (_, n) in &mut self.counts {
            *n = 0;
        }
        layers
    }

    fn flatten(&self) -> Vec<Color> {
        self.counts
            .iter()
            .flat_map(|(color, n)| std::iter::repeat_n(*color, *n))
            .collect()
    }
}

/// Places the selected colors per `config.pattern`, then appends the empty
/// containers.
pub fn build_layout<R: Rng + ?Sized>(colors: &[Color], config: &LevelConfig, rng: &mut R) -> Layout {
    let filled = if colors.is_empty() || config.filled_container_count() == 0 {
        Vec::new()
    } else {
        match config.pattern {
            Pattern::Alternating => alternating(colors, config),
            Pattern::Clustered => clustered(colors, config),
            Pattern::Rainbow => rainbow(colors, config),
            Pattern::Mirror | Pattern::Symmetrical => mirror(colors, config),
            Pattern::Spiral => spiral(colors, config),
            Pattern::Gradient => shuffled(colors, config, rng),
        }
    };
    let mut containers = settle(filled, Vec::new(), config);
    containers.extend((0..config.empty_container_count).map(|_| Container::new(config.layer_capacity)));
    Layout::new(containers)
}

/// Layers per filled container when the pool is spread evenly.
fn even_share(total: usize, config: &LevelConfig) -> usize {
    config
        .layer_capacity
        .min(total.div_ceil(config.filled_container_count().max(1)))
}

fn alternating(colors: &[Color], config: &LevelConfig) -> Vec<Container> {
    let mut pool = LayerPool::new(colors, config.layer_capacity);
    let per_container = even_share(pool.remaining(), config);
    let containers = (0..config.filled_container_count())
        .map(|index| {
            let mut container = Container::new(config.layer_capacity);
            for layer in 0..per_container {
                let color = colors[(index + layer) % colors.len()];
                if pool.take(color) {
                    container.push(color);
                }
            }
            container
        })
        .collect();
    settle(containers, pool.drain(), config)
}

fn clustered(colors: &[Color], config: &LevelConfig) -> Vec<Container> {
    let mut pool = LayerPool::new(colors, config.layer_capacity);
    let clusters = colors.len().div_ceil(2);
    let per_cluster = colors.len().div_ceil(clusters);
    let filled = config.filled_container_count();

    let mut containers = Vec::with_capacity(filled);
    for cluster in colors.chunks(per_cluster) {
        for _ in 0..2 {
            if containers.len() >= filled {
                break;
            }
            let mut container = Container::new(config.layer_capacity);
            for layer in 0..config.layer_capacity {
                let color = cluster[layer % cluster.len()];
                if pool.take(color) {
                    container.push(color);
                }
            }
            if !container.is_empty() {
                containers.push(container);
            }
        }
    }
    settle(containers, pool.drain(), config)
}

fn rainbow(colors: &[Color], config: &LevelConfig) -> Vec<Container> {
    let mut order = colors.to_vec();
    order.sort();
    let mut pool = LayerPool::new(&order, config.layer_capacity);
    let per_container = even_share(pool.remaining(), config);
    let containers = (0..config.filled_container_count())
        .map(|index| {
            let mut container = Container::new(config.layer_capacity);
            for layer in 0..per_container {
                if let Some(color) = pool.take_nearest(index * 2 + layer) {
                    container.push(color);
                }
            }
            container
        })
        .collect();
    settle(containers, pool.drain(), config)
}

/// First half built by cycling colors over half of the pool; second half is
/// the first half reversed, in reverse container order.
fn mirror(colors: &[Color], config: &LevelConfig) -> Vec<Container> {
    let half = config.filled_container_count() / 2;
    if half == 0 {
        return alternating(colors, config);
    }
    let mut second_pool = LayerPool::new(colors, config.layer_capacity);
    let mut first_pool = second_pool.split_half();
    let per_container = config
        .layer_capacity
        .min(first_pool.remaining().div_ceil(half));

    let mut containers: Vec<Container> = (0..half)
        .map(|index| {
            let mut container = Container::new(config.layer_capacity);
            for layer in 0..per_container {
                if let Some(color) = first_pool.take_nearest(index + layer) {
                    container.push(color);
                }
            }
            container
        })
        .collect();

    let mirrored: Vec<Container> = containers
        .iter()
        .rev()
        .map(|original| {
            let layers = original.get_layers().iter().rev().copied();
            let layers: Vec<Color> = layers.filter(|c| second_pool.take(*c)).collect();
            Container::with_layers(config.layer_capacity, layers)
        })
        .collect();
    containers.extend(mirrored);

    let mut leftovers = first_pool.drain();
    leftovers.extend(second_pool.drain());
    settle(containers, leftovers, config)
}

/// Visit order over `len` positions: advance by `step`, growing the step each
/// time another `colors` positions have been visited. Landing on a visited
/// position probes forward to the next unvisited one.
pub fn spiral_order(len: usize, colors: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    let mut visited = vec![false; len];
    let mut index = 0;
    let mut step = 1;
    while order.len() < len {
        if visited[index] {
            index = (1..len)
                .map(|k| (index + k) % len)
                .find(|i| !visited[*i])
                .unwrap_or(index);
        }
        visited[index] = true;
        order.push(index);
        if colors > 0 && order.len() % colors == 0 {
            step += 1;
        }
        index = (index + step) % len;
    }
    order
}

fn spiral(colors: &[Color], config: &LevelConfig) -> Vec<Container> {
    let layers = LayerPool::new(colors, config.layer_capacity).drain();
    let permuted = spiral_order(layers.len(), colors.len())
        .into_iter()
        .map(|i| layers[i])
        .collect();
    slice_evenly(permuted, config)
}

/// Fallback strategy: shuffle the whole pool once per difficulty rank, then
/// slice it contiguously.
fn shuffled<R: Rng + ?Sized>(colors: &[Color], config: &LevelConfig, rng: &mut R) -> Vec<Container> {
    let mut layers = LayerPool::new(colors, config.layer_capacity).drain();
    for _ in 0..config.difficulty.max(1) {
        layers.shuffle(rng);
    }
    slice_evenly(layers, config)
}

/// Contiguous slices, the leading containers taking one extra layer each
/// until the remainder is used up.
fn slice_evenly(layers: Vec<Color>, config: &LevelConfig) -> Vec<Container> {
    let filled = config.filled_container_count().max(1);
    let base = layers.len() / filled;
    let extra = layers.len() % filled;
    let mut layers = layers.into_iter();
    let containers = (0..filled)
        .map(|index| {
            let take = base + usize::from(index < extra);
            Container::with_layers(config.layer_capacity, layers.by_ref().take(take))
        })
        .collect();
    settle(containers, layers.collect(), config)
}

/// Pads to the filled container count and spreads `leftovers` round-robin
/// over containers with free space.
fn settle(mut containers: Vec<Container>, leftovers: Vec<Color>, config: &LevelConfig) -> Vec<Container> {
    while containers.len() < config.filled_container_count() {
        containers.push(Container::new(config.layer_capacity));
    }
    let mut cursor = 0;
    for color in leftovers.into_iter().rev() {
        let count = containers.len();
        let slot = (0..count).map(|k| (cursor + k) % count).find(|i| !containers[*i].is_full());
        match slot {
            Some(index) => {
                containers[index].push(color);
                cursor = (index + 1) % count;
            }
            None => {
                warn!("no room left for a {} layer, adding a container", color);
                containers.push(Container::with_layers(config.layer_capacity, [color]));
            }
        }
    }
    containers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(pattern: Pattern, colors: usize, containers: usize, capacity: usize) -> LevelConfig {
        LevelConfig {
            color_count: colors,
            container_count: containers,
            empty_container_count: 2,
            layer_capacity: capacity,
            difficulty: 5,
            pattern,
        }
    }

    fn layers_of(layout: &Layout) -> Vec<Vec<Color>> {
        layout.get_containers().iter().map(|c| c.get_layers().to_vec()).collect()
    }

    fn assert_well_formed(layout: &Layout, colors: &[Color], config: &LevelConfig) {
        assert_eq!(layout.len(), config.container_count);
        for color in colors {
            assert_eq!(layout.count_color(*color), config.layer_capacity, "{color} count");
        }
        for container in layout.get_containers() {
            assert!(container.len() <= config.layer_capacity);
        }
        let tail = &layout.get_containers()[config.filled_container_count()..];
        assert!(tail.iter().all(Container::is_empty));
    }

    #[test]
    fn alternating_cycles_colors_per_container() {
        let colors = [Red, Blue, Green];
        let config = config(Pattern::Alternating, 3, 5, 4);
        let layout = build_layout(&colors, &config, &mut StdRng::seed_from_u64(1));
        assert_eq!(
            layers_of(&layout)[..3],
            [
                vec![Red, Blue, Green, Red],
                vec![Blue, Green, Red, Blue],
                vec![Green, Red, Blue, Green],
            ]
        );
        assert_well_formed(&layout, &colors, &config);
    }

    #[test]
    fn clustered_pairs_colors() {
        let colors = [Red, Blue, Green];
        let config = config(Pattern::Clustered, 3, 5, 4);
        let layout = build_layout(&colors, &config, &mut StdRng::seed_from_u64(1));
        assert_eq!(
            layers_of(&layout)[..3],
            [
                vec![Red, Blue, Red, Blue],
                vec![Red, Blue, Red, Blue],
                vec![Green, Green, Green, Green],
            ]
        );
        assert_well_formed(&layout, &colors, &config);
    }

    #[test]
    fn rainbow_bands_use_catalog_order() {
        let colors = [Blue, Red, Green];
        let config = config(Pattern::Rainbow, 3, 5, 4);
        let layout = build_layout(&colors, &config, &mut StdRng::seed_from_u64(1));
        assert_eq!(
            layers_of(&layout)[..3],
            [
                vec![Red, Blue, Green, Red],
                vec![Green, Red, Blue, Green],
                vec![Blue, Green, Red, Blue],
            ]
        );
        assert_well_formed(&layout, &colors, &config);
    }

    #[test]
    fn mirror_second_half_reverses_first() {
        let colors = [Red, Blue, Green, Yellow];
        let config = config(Pattern::Mirror, 4, 8, 4);
        let layout = build_layout(&colors, &config, &mut StdRng::seed_from_u64(1));
        let layers = layers_of(&layout);
        for k in 0..3 {
            let mut reversed = layers[k].clone();
            reversed.reverse();
            assert_eq!(layers[5 - k], reversed);
        }
        assert_well_formed(&layout, &colors, &config);
    }

    #[test]
    fn symmetrical_levels_leave_no_gap_in_the_filled_region() {
        let colors = [Red, Blue, Green, Yellow];
        let config = crate::generator::config::build_config(1, crate::mode::Mode::Normal, Pattern::Symmetrical);
        let layout = build_layout(&colors, &config, &mut StdRng::seed_from_u64(1));
        let filled = config.filled_container_count();
        let containers = layout.get_containers();
        assert!(containers[..filled].iter().all(|c| !c.is_empty()));
        assert_eq!(layout.empty_container_count(), config.empty_container_count);
        for k in 0..filled / 2 {
            let mut reversed = containers[k].get_layers().to_vec();
            reversed.reverse();
            assert_eq!(containers[filled - 1 - k].get_layers(), &reversed[..]);
        }
        assert_well_formed(&layout, &colors, &config);
    }

    #[test]
    fn spiral_order_is_a_permutation() {
        assert_eq!(spiral_order(6, 2), vec![0, 1, 3, 5, 2, 4]);
        for (len, colors) in [(16, 4), (40, 8), (60, 12), (25, 5), (1, 1)] {
            let mut order = spiral_order(len, colors);
            order.sort();
            assert_eq!(order, (0..len).collect::<Vec<_>>());
        }
    }

    #[test]
    fn shuffle_is_reproducible_for_a_seed() {
        let colors = [Red, Blue, Green, Yellow, Purple];
        let config = config(Pattern::Gradient, 5, 9, 4);
        let first = build_layout(&colors, &config, &mut StdRng::seed_from_u64(42));
        let second = build_layout(&colors, &config, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
        assert_well_formed(&first, &colors, &config);
    }

    #[test]
    fn every_pattern_keeps_color_totals() {
        let colors = [Red, Blue, Green, Yellow, Purple, Orange, Cyan];
        let mut rng = StdRng::seed_from_u64(7);
        for pattern in Pattern::ALL {
            for (containers, capacity) in [(9, 4), (10, 5), (12, 6), (9, 3)] {
                let config = config(pattern, colors.len(), containers, capacity);
                let layout = build_layout(&colors, &config, &mut rng);
                assert_well_formed(&layout, &colors, &config);
            }
        }
    }

    #[test]
    fn pool_take_nearest_skips_exhausted_colors() {
        let mut pool = LayerPool::new(&[Red, Blue], 1);
        assert_eq!(pool.take_nearest(0), Some(Red));
        assert_eq!(pool.take_nearest(0), Some(Blue));
        assert_eq!(pool.take_nearest(0), None);
        assert!(pool.is_empty());
    }
}
