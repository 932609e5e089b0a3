#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::scene::Token;

/// Topmost token under `world_pt`, if any.
///
/// Tokens are tested from the end of the list so the one painted last wins.
/// Every token is treated as a circle of diameter `size`, square ones included.
#[must_use]
pub fn hit_test_token(tokens: &[Token], world_pt: Point) -> Option<&Token> {
    tokens.iter().rev().find(|token| token_contains(token, world_pt))
}

/// Whether `world_pt` lies within `size / 2` of the token center.
#[must_use]
pub fn token_contains(token: &Token, world_pt: Point) -> bool {
    token.position().distance_to(world_pt) <= token.size / 2.0
}
