#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Dungeon Runner adapters.
//!
//! Everything here is pure: scenes are built from world snapshots as lists of
//! coloured quads in viewport pixels, leaving the drawing itself to whichever
//! adapter consumes them.

use dungeon_runner_core::{Level, Tile, TilePos};
use dungeon_runner_world::{query, World};
use glam::{IVec2, UVec2, Vec2};

/// Glyph used for the player in text frames.
pub const PLAYER_GLYPH: char = '@';
/// Glyph used for enemies in text frames.
pub const ENEMY_GLYPH: char = 'X';

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts the color back into byte RGB values, dropping alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
            .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// Colors assigned to tiles and entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Color cleared behind the level.
    pub background: Color,
    /// Floor tiles.
    pub floor: Color,
    /// Wall tiles.
    pub wall: Color,
    /// The start tile.
    pub start: Color,
    /// The exit tile.
    pub exit: Color,
    /// The player marker.
    pub player: Color,
    /// Enemy markers.
    pub enemy: Color,
}

impl Palette {
    /// Color of the provided tile.
    #[must_use]
    pub const fn tile(&self, tile: Tile) -> Color {
        match tile {
            Tile::Floor => self.floor,
            Tile::Wall => self.wall,
            Tile::Start => self.start,
            Tile::Exit => self.exit,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(20, 20, 20),
            floor: Color::from_rgb_u8(40, 40, 40),
            wall: Color::from_rgb_u8(110, 110, 110),
            start: Color::from_rgb_u8(40, 140, 40),
            exit: Color::from_rgb_u8(140, 40, 40),
            player: Color::from_rgb_u8(220, 220, 80),
            enemy: Color::from_rgb_u8(200, 60, 200),
        }
    }
}

/// Tile size and centring offset used to fit a level into a viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderParams {
    tile_size: u32,
    offset: IVec2,
}

impl RenderParams {
    /// Edge length of a tile in pixels, never zero.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Pixel offset of the level's top-left corner; negative when the level
    /// overflows the viewport.
    #[must_use]
    pub const fn offset(&self) -> IVec2 {
        self.offset
    }

    /// Pixel position of the top-left corner of a tile.
    #[must_use]
    pub fn tile_origin(&self, pos: TilePos) -> IVec2 {
        let size = self.tile_size as i32;
        self.offset + IVec2::new(pos.x(), pos.y()) * size
    }

    /// Inset applied to entity markers inside their tile.
    #[must_use]
    pub fn entity_inset(&self) -> u32 {
        (self.tile_size / 8).max(2)
    }
}

/// Computes the largest square tile size that fits the level in the viewport
/// and the offset that centres it.
#[must_use]
pub fn compute_render_params(level: &Level, viewport: UVec2) -> RenderParams {
    let width = level.width().max(1);
    let height = level.height().max(1);
    let tile_size = (viewport.x / width).min(viewport.y / height).max(1);

    let centre = |available: u32, tiles: u32| -> i32 {
        let spare = i64::from(available) - i64::from(tiles) * i64::from(tile_size);
        spare
            .div_euclid(2)
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    };

    RenderParams {
        tile_size,
        offset: IVec2::new(centre(viewport.x, width), centre(viewport.y, height)),
    }
}

/// Draw order of a quad; later layers cover earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Level tiles.
    Tile,
    /// Enemy markers.
    Enemy,
    /// The player marker.
    Player,
}

/// Axis-aligned filled rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
    /// Draw layer.
    pub layer: Layer,
}

/// Frame description produced from a world snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    params: RenderParams,
    clear_color: Color,
    quads: Vec<Quad>,
}

impl Scene {
    /// Builds the tile layer of a level without any entities.
    #[must_use]
    pub fn from_level(level: &Level, palette: &Palette, viewport: UVec2) -> Self {
        let params = compute_render_params(level, viewport);
        let tile_extent = Vec2::splat(params.tile_size as f32);
        let quads = level
            .iter_tiles()
            .map(|(pos, tile)| Quad {
                origin: params.tile_origin(pos).as_vec2(),
                size: tile_extent,
                color: palette.tile(tile),
                layer: Layer::Tile,
            })
            .collect();

        Self {
            params,
            clear_color: palette.background,
            quads,
        }
    }

    /// Builds a full frame: tiles, then enemies, then the player.
    #[must_use]
    pub fn from_world(world: &World, palette: &Palette, viewport: UVec2) -> Self {
        let mut scene = Self::from_level(query::level(world), palette, viewport);
        for enemy in query::enemies(world).iter() {
            let quad = scene.entity_quad(enemy.position, palette.enemy, Layer::Enemy);
            scene.quads.push(quad);
        }
        let player = scene.entity_quad(query::player(world), palette.player, Layer::Player);
        scene.quads.push(player);
        scene
    }

    fn entity_quad(&self, pos: TilePos, color: Color, layer: Layer) -> Quad {
        let inset = self.params.entity_inset();
        let extent = self.params.tile_size.saturating_sub(2 * inset) as f32;
        Quad {
            origin: (self.params.tile_origin(pos) + IVec2::splat(inset as i32)).as_vec2(),
            size: Vec2::splat(extent),
            color,
            layer,
        }
    }

    /// Parameters used to lay out the scene.
    #[must_use]
    pub const fn params(&self) -> RenderParams {
        self.params
    }

    /// Color the frame is cleared to.
    #[must_use]
    pub const fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Quads in draw order.
    #[must_use]
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }
}

/// Renders the world as text rows: the level legend with enemies and the
/// player drawn on top.
#[must_use]
pub fn ascii_frame(world: &World) -> Vec<String> {
    let level = query::level(world);
    let mut rows: Vec<Vec<char>> = level
        .grid()
        .to_ascii()
        .into_iter()
        .map(|row| row.chars().collect())
        .collect();

    let mut stamp = |pos: TilePos, glyph: char| {
        let cell = usize::try_from(pos.y())
            .ok()
            .zip(usize::try_from(pos.x()).ok())
            .and_then(|(y, x)| rows.get_mut(y).and_then(|row| row.get_mut(x)));
        if let Some(cell) = cell {
            *cell = glyph;
        }
    };
    for enemy in query::enemies(world).iter() {
        stamp(enemy.position, ENEMY_GLYPH);
    }
    stamp(query::player(world), PLAYER_GLYPH);

    rows.into_iter().map(|row| row.into_iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_runner_world::WorldConfig;

    fn demo() -> Level {
        Level::from_ascii(
            ["##########", "#S......E#", "#........#", "##########"],
            "fallback_demo",
        )
        .expect("valid level")
    }

    #[test]
    fn demo_level_fills_the_default_viewport_width() {
        let params = compute_render_params(&demo(), UVec2::new(960, 540));
        assert_eq!(params.tile_size(), 96);
        assert_eq!(params.offset(), IVec2::new(0, 78));
    }

    #[test]
    fn offsets_round_towards_negative_infinity() {
        let params = compute_render_params(&demo(), UVec2::new(5, 5));
        assert_eq!(params.tile_size(), 1);
        assert_eq!(params.offset(), IVec2::new(-3, 0));
    }

    #[test]
    fn zero_viewport_still_has_unit_tiles() {
        let params = compute_render_params(&demo(), UVec2::ZERO);
        assert_eq!(params.tile_size(), 1);
        assert_eq!(params.offset(), IVec2::new(-5, -2));
    }

    #[test]
    fn palette_matches_tile_colors() {
        let palette = Palette::default();
        assert_eq!(palette.tile(Tile::Floor).to_rgb_u8(), [40, 40, 40]);
        assert_eq!(palette.tile(Tile::Wall).to_rgb_u8(), [110, 110, 110]);
        assert_eq!(palette.tile(Tile::Start).to_rgb_u8(), [40, 140, 40]);
        assert_eq!(palette.tile(Tile::Exit).to_rgb_u8(), [140, 40, 40]);
        assert_eq!(palette.player.to_rgb_u8(), [220, 220, 80]);
        assert_eq!(palette.enemy.to_rgb_u8(), [200, 60, 200]);
    }

    #[test]
    fn scene_draws_tiles_then_enemies_then_player() {
        let level = demo().with_enemies([TilePos::new(5, 2)]).expect("valid");
        let world = World::new(level, WorldConfig::default(), 0);
        let scene = Scene::from_world(&world, &Palette::default(), UVec2::new(960, 540));

        let quads = scene.quads();
        assert_eq!(quads.len(), 10 * 4 + 2);
        assert!(quads.windows(2).all(|pair| pair[0].layer <= pair[1].layer));

        let player = quads.last().expect("player quad");
        assert_eq!(player.layer, Layer::Player);
        assert_eq!(player.origin, Vec2::new(96.0 + 12.0, 78.0 + 96.0 + 12.0));
        assert_eq!(player.size, Vec2::splat(72.0));

        let enemy = quads[quads.len() - 2];
        assert_eq!(enemy.layer, Layer::Enemy);
        assert_eq!(enemy.origin, Vec2::new(5.0 * 96.0 + 12.0, 78.0 + 2.0 * 96.0 + 12.0));
    }

    #[test]
    fn tiny_tiles_collapse_entity_markers() {
        let world = World::new(demo(), WorldConfig::default(), 0);
        let scene = Scene::from_world(&world, &Palette::default(), UVec2::new(20, 8));
        assert_eq!(scene.params().tile_size(), 2);
        let player = scene.quads().last().expect("player quad");
        assert_eq!(player.size, Vec2::ZERO);
    }

    #[test]
    fn ascii_frame_overlays_entities() {
        let level = demo().with_enemies([TilePos::new(4, 2)]).expect("valid");
        let world = World::new(level, WorldConfig::default(), 0);
        assert_eq!(
            ascii_frame(&world),
            vec!["##########", "#@......E#", "#...X....#", "##########"]
        );
    }
}
