//! Viewer-owned car materials
//!
//! The model ships with its own materials. Meshes whose authored material
//! is bound to a [`MaterialSlot`] are rendered with the viewer's material
//! instead, so a color picker can recolor every panel at once.

use glam::Vec3;

use crate::error::{ViewerError, ViewerResult};

/// Material slots the user can recolor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    Paint,
    Details,
    Glass,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 3] = [MaterialSlot::Paint, MaterialSlot::Details, MaterialSlot::Glass];

    pub fn name(self) -> &'static str {
        match self {
            MaterialSlot::Paint => "paint",
            MaterialSlot::Details => "details",
            MaterialSlot::Glass => "glass",
        }
    }
}

/// Physically based material parameters handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// sRGB color, components in 0..1
    pub color: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub transmission: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            color: Vec3::ONE,
            metallic: 0.0,
            roughness: 0.5,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            transmission: 0.0,
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_clearcoat(mut self, clearcoat: f32, roughness: f32) -> Self {
        self.clearcoat = clearcoat;
        self.clearcoat_roughness = roughness;
        self
    }

    pub fn with_transmission(mut self, transmission: f32) -> Self {
        self.transmission = transmission;
        self
    }

    // Preset materials

    /// Clear-coated metallic body paint
    pub fn car_paint() -> Self {
        Self::new("Car Paint")
            .with_color(Vec3::new(1.0, 0.0, 0.0))
            .with_metallic(1.0)
            .with_roughness(0.5)
            .with_clearcoat(1.0, 0.03)
    }

    pub fn details() -> Self {
        Self::new("Details")
            .with_color(Vec3::ONE)
            .with_metallic(1.0)
            .with_roughness(0.5)
    }

    pub fn glass() -> Self {
        Self::new("Glass")
            .with_color(Vec3::ONE)
            .with_metallic(0.25)
            .with_roughness(0.0)
            .with_transmission(1.0)
    }
}

/// Parse a CSS hex color (`#rgb` or `#rrggbb`) into 0..1 components
pub fn parse_hex_color(value: &str) -> ViewerResult<Vec3> {
    let invalid = || ViewerError::InvalidColor(value.to_string());
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    let (r, g, b) = match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            (expand(0)?, expand(1)?, expand(2)?)
        }
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        _ => return Err(invalid()),
    };

    Ok(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
}

/// Format 0..1 components back into `#rrggbb`
pub fn format_hex_color(color: Vec3) -> String {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    format!("#{:02x}{:02x}{:02x}", c.x as u8, c.y as u8, c.z as u8)
}

/// The three recolorable materials
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLibrary {
    paint: Material,
    details: Material,
    glass: Material,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self {
            paint: Material::car_paint(),
            details: Material::details(),
            glass: Material::glass(),
        }
    }
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: MaterialSlot) -> &Material {
        match slot {
            MaterialSlot::Paint => &self.paint,
            MaterialSlot::Details => &self.details,
            MaterialSlot::Glass => &self.glass,
        }
    }

    pub fn get_mut(&mut self, slot: MaterialSlot) -> &mut Material {
        match slot {
            MaterialSlot::Paint => &mut self.paint,
            MaterialSlot::Details => &mut self.details,
            MaterialSlot::Glass => &mut self.glass,
        }
    }

    /// Set a slot's color from a color-picker value. The color is left
    /// unchanged if the value does not parse.
    pub fn set_color(&mut self, slot: MaterialSlot, value: &str) -> ViewerResult<()> {
        let color = parse_hex_color(value)?;
        self.get_mut(slot).color = color;
        log::debug!("{} color set to {}", slot.name(), value);
        Ok(())
    }
}
