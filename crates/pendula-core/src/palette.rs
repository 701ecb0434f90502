use serde::{Deserialize, Serialize};

/// Packed `0xRRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }
}

pub const PALETTE: [Rgb; 10] = [
    Rgb(0xff0000),
    Rgb(0xff7f00),
    Rgb(0xffff00),
    Rgb(0x00ff00),
    Rgb(0x00ffff),
    Rgb(0x0000ff),
    Rgb(0x7f00ff),
    Rgb(0xff00ff),
    Rgb(0xff007f),
    Rgb(0xff0000),
];

/// Trail color of the chain at `index`.
pub fn chain_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}
