// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::Vec3;

/// A ray with a remaining bounce budget. `direction` need not be unit
/// length; intersection distances are in units of it.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub ttl: i32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, ttl: i32) -> Self {
        Self {
            origin,
            direction,
            ttl,
        }
    }
}
