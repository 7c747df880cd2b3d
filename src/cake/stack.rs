//! Vertical placement of the inner layers inside the frosting shell.
//!
//! Heights are fractions of the cake height. Whatever they leave over is split evenly into a gap
//! below the bottom layer and a gap above the top layer, so the inner stack is centred in the
//! shell. All positions are relative to the shell centre.

use crate::error::{SceneError, ensure_positive};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerProportions {
    pub bottom: f32,
    pub middle: f32,
    pub top: f32,
}

impl Default for LayerProportions {
    fn default() -> Self {
        Self {
            bottom: 0.45,
            middle: 0.15,
            top: 0.25,
        }
    }
}

impl LayerProportions {
    pub fn total(&self) -> f32 {
        self.bottom + self.middle + self.top
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerSlot {
    pub height: f32,
    pub bottom: f32,
    pub top: f32,
    pub center_y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStack {
    pub cake_height: f32,
    pub gap_bottom: f32,
    pub gap_top: f32,
    /// Bottom to top.
    pub slots: [LayerSlot; 3],
}

impl LayerStack {
    pub fn new(cake_height: f32, proportions: &LayerProportions) -> Result<Self, SceneError> {
        let cake_height = ensure_positive("cake_height", cake_height)?;
        let fractions = [
            ensure_positive("proportions.bottom", proportions.bottom)?,
            ensure_positive("proportions.middle", proportions.middle)?,
            ensure_positive("proportions.top", proportions.top)?,
        ];
        let total = proportions.total();
        if total > 1.0 {
            return Err(SceneError::invalid(
                "proportions",
                format!("layers take up {total} of the cake height, at most 1.0 fits"),
            ));
        }

        let spare = cake_height * (1.0 - total);
        let gap_bottom = spare / 2.0;
        let gap_top = spare / 2.0;

        let mut bottom = -cake_height / 2.0 + gap_bottom;
        let slots = fractions.map(|fraction| {
            let height = cake_height * fraction;
            let slot = LayerSlot {
                height,
                bottom,
                top: bottom + height,
                center_y: bottom + height / 2.0,
            };
            bottom = slot.top;
            slot
        });

        Ok(Self {
            cake_height,
            gap_bottom,
            gap_top,
            slots,
        })
    }

    pub fn bottom(&self) -> &LayerSlot {
        &self.slots[0]
    }

    pub fn middle(&self) -> &LayerSlot {
        &self.slots[1]
    }

    pub fn top(&self) -> &LayerSlot {
        &self.slots[2]
    }

    pub fn inner_height(&self) -> f32 {
        self.slots.iter().map(|slot| slot.height).sum()
    }
}
