//! 角色配色
//!
//! 同一次渲染内，相同角色名称得到相同的颜色对；缓存不跨渲染保存。

use std::collections::HashMap;

/// 背景色 + 前景色
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    pub background: String,
    pub foreground: String,
}

/// 单次渲染用的角色配色缓存
#[derive(Debug, Default)]
pub struct RoleColors {
    cache: HashMap<String, ColorPair>,
}

impl RoleColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取角色对应的颜色对，首次访问时生成
    pub fn color_for(&mut self, role: &str) -> ColorPair {
        self.cache
            .entry(role.to_string())
            .or_insert_with(|| generate(role))
            .clone()
    }

    /// 已分配颜色的角色数量
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn generate(role: &str) -> ColorPair {
    let hash = fnv1a(role.as_bytes());
    let r = (hash >> 16) as u8;
    let g = (hash >> 8) as u8;
    let b = hash as u8;

    // 亮背景配黑字，暗背景配白字
    let brightness = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    let foreground = if brightness >= 128 { "#000000" } else { "#ffffff" };

    ColorPair {
        background: format!("#{:02x}{:02x}{:02x}", r, g, b),
        foreground: foreground.to_string(),
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}
