// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (device user, security headers).

pub mod security;
pub mod user;

pub use user::{require_user, DeviceUser};
