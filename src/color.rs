use crate::error::{Error, Result};

/// 赤(0°)から緑(120°)までの色相範囲
const HUE_SPAN: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// 先頭の`#`なし、小文字6桁
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// 範囲外の値の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampPolicy {
    /// `[min, max]`に丸めて純粋な赤/緑にする
    ///
    /// 範囲外の値は外挿しないので、外挿する従来の出力とは色が異なる（例: 6 は `00ff7f` ではなく `00ff00`）
    #[default]
    Clamp,
    /// 線形に外挿し、色相環を一周させる
    Extrapolate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    min: f64,
    max: f64,
    policy: RampPolicy,
}

impl ColorRamp {
    pub fn new(min: f64, max: f64, policy: RampPolicy) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(Error::InvalidColorRange { min, max });
        }
        Ok(Self { min, max, policy })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn policy(&self) -> RampPolicy {
        self.policy
    }

    /// 値に対応する色相（度）
    pub fn hue(&self, value: f64) -> f64 {
        let value = match self.policy {
            RampPolicy::Clamp => value.clamp(self.min, self.max),
            RampPolicy::Extrapolate => value,
        };
        (value - self.min) / (self.max - self.min) * HUE_SPAN
    }

    pub fn color(&self, value: f64) -> Rgb {
        let (r, g, b) = hsv_to_rgb(self.hue(value), 1.0, 1.0);
        Rgb(to_channel(r), to_channel(g), to_channel(b))
    }

    pub fn hex(&self, value: f64) -> String {
        self.color(value).to_hex()
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 5.0,
            policy: RampPolicy::Clamp,
        }
    }
}

/// `val`を`min..max`の範囲で赤から緑の色に変換する（範囲外は外挿）
pub fn pseudocolor(val: f64, min: f64, max: f64) -> Rgb {
    let hue = (val - min) / (max - min) * HUE_SPAN;
    let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
    Rgb(to_channel(r), to_channel(g), to_channel(b))
}

// 四捨五入ではなく切り捨て
fn to_channel(c: f64) -> u8 {
    (c * 255.0) as u8
}

/// HSV -> RGB。色相は度で与え、360度で一周する
pub fn hsv_to_rgb(hue: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }

    // 360で割ってから6倍する（度のまま60で割ると丸めが変わる）
    let h6 = (hue / 360.0).rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
