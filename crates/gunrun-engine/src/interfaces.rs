//! Host-facing collaborator traits.
//!
//! The simulation draws, plays sounds, and reads input only through these
//! traits. Hosts implement them over whatever backend they have; tests
//! implement them with tiny stubs. Nothing here owns a device.

use thiserror::Error;

use gunrun_core::rect::Rect;
use gunrun_core::resources::{SoundId, TextureId};

/// Mixer ceiling for [`AudioPlayer`] volumes.
pub const MAX_VOLUME: u8 = 128;
/// Volume used for all in-game effects and music.
pub const DEFAULT_VOLUME: u8 = 64;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Logical game actions. The host maps physical keys onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Key {
    MoveLeft,
    MoveRight,
    Jump,
    Fire,
}

/// Level-triggered key state, polled every tick.
///
/// Jumping is the exception: it is edge-triggered and arrives through
/// [`World::key_event`](crate::world::World::key_event) instead, so holding
/// the key does not bounce the player.
pub trait InputSource {
    fn is_key_down(&self, key: Key) -> bool;
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(200, 40, 40);
    pub const GREEN: Color = Color::rgb(40, 180, 60);
    pub const ORANGE: Color = Color::rgb(230, 150, 30);
    pub const GRAY: Color = Color::rgb(60, 60, 60);
}

/// A draw call failed. The world logs these and keeps rendering; one bad
/// sprite never takes the frame down.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    #[error("unknown texture handle {0:?}")]
    UnknownTexture(TextureId),
    #[error("renderer backend failure: {0}")]
    Backend(String),
}

/// Immediate-mode draw sink for one frame.
///
/// `src` is a region of the texture in texel units; `dst` is in viewport
/// units with the scroll offset already applied by the caller.
pub trait Renderer {
    fn draw_sprite(
        &mut self,
        texture: TextureId,
        src: Rect,
        dst: Rect,
        flip_horizontal: bool,
    ) -> Result<(), DrawError>;

    /// Draw a sprite modulated by `tint`. Used for the hit flash; backends
    /// without color modulation can rely on this default and draw untinted.
    fn draw_sprite_tinted(
        &mut self,
        texture: TextureId,
        src: Rect,
        dst: Rect,
        flip_horizontal: bool,
        _tint: Color,
    ) -> Result<(), DrawError> {
        self.draw_sprite(texture, src, dst, flip_horizontal)
    }

    /// Draw a solid or outlined rectangle in viewport units. Used for
    /// health bars and debug collider overlays.
    fn draw_rect(&mut self, rect: Rect, color: Color, filled: bool);
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// Fire-and-forget audio sink.
pub trait AudioPlayer {
    /// Play a sound effect once at the given volume (0..=[`MAX_VOLUME`]).
    fn play_once(&mut self, sound: SoundId, volume: u8);

    /// Start a track looping until replaced.
    fn play_loop(&mut self, sound: SoundId, volume: u8);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingRenderer {
        sprites: Vec<(TextureId, Rect, Rect, bool)>,
        rects: Vec<(Rect, Color, bool)>,
    }

    impl Renderer for RecordingRenderer {
        fn draw_sprite(
            &mut self,
            texture: TextureId,
            src: Rect,
            dst: Rect,
            flip_horizontal: bool,
        ) -> Result<(), DrawError> {
            self.sprites.push((texture, src, dst, flip_horizontal));
            Ok(())
        }

        fn draw_rect(&mut self, rect: Rect, color: Color, filled: bool) {
            self.rects.push((rect, color, filled));
        }
    }

    #[test]
    fn tinted_default_forwards_to_plain_draw() {
        let mut renderer = RecordingRenderer::default();
        let src = Rect::new(0.0, 0.0, 32.0, 32.0);
        let dst = Rect::new(10.0, 20.0, 32.0, 32.0);

        renderer
            .draw_sprite_tinted(TextureId(3), src, dst, true, Color::WHITE)
            .unwrap();

        assert_eq!(renderer.sprites.len(), 1);
        let (texture, got_src, got_dst, flip) = renderer.sprites[0];
        assert_eq!(texture, TextureId(3));
        assert_eq!(got_src, src);
        assert_eq!(got_dst, dst);
        assert!(flip);
    }

    #[test]
    fn rgb_colors_are_opaque() {
        assert_eq!(Color::WHITE.a, 255);
        assert_eq!(Color::rgb(1, 2, 3), Color::rgba(1, 2, 3, 255));
    }
}
