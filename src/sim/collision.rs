//! Collision detection and response
//!
//! Landing on platforms (jump), coin pickup radius (jump) and the basket
//! forgiveness zone (catcher).

use glam::Vec2;

use super::geom::{Rect, distance};
use super::state::{Coin, FallingItem, Platform, Player};

/// Result of a landing check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Player center y that rests exactly on the platform surface
    pub rest_y: f32,
}

/// Check whether a descending player lands on a platform this tick
///
/// `prev_bottom` is the player's bottom edge before integration. A landing
/// needs horizontal overlap, a non-rising player, and a bottom edge that
/// either overlaps the platform box now or crossed its top edge since the
/// previous tick (so fast falls do not tunnel through thin platforms).
pub fn player_platform_landing(
    player: &Player,
    prev_bottom: f32,
    platform: &Platform,
) -> Option<Landing> {
    if !platform.active || player.velocity.y > 0.0 {
        return None;
    }

    let player_box = player.rect();
    let platform_box = platform.rect();
    if !player_box.overlaps_x(&platform_box) {
        return None;
    }

    let top = platform.top();
    let overlapping = player_box.intersects(&platform_box);
    let crossed = prev_bottom >= top && player.bottom() <= top;

    if overlapping || crossed {
        Some(Landing {
            rest_y: top + player.radius,
        })
    } else {
        None
    }
}

/// Whether the player center is within `pickup_radius` of an uncollected coin
pub fn coin_in_reach(player_pos: Vec2, coin: &Coin, pickup_radius: f32) -> bool {
    !coin.collected && distance(player_pos, coin.position) < pickup_radius
}

/// Whether a falling item touches the basket pickup zone
pub fn item_in_pickup(item: &FallingItem, pickup: &Rect) -> bool {
    !item.caught && item.rect().intersects(pickup)
}
