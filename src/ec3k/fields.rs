//! Field layout and extraction for the 41-byte EC3K frame.
//!
//! Fields are addressed in nibbles: nibble `2k` is the high nibble of byte
//! `k`, nibble `2k + 1` the low nibble. Every field is read by the same
//! routine, [`extract_nibbles`], driven by the static [`LAYOUT`] table.
//!
//! Several counters are split in two: a low part near the start of the frame
//! and a high part further back, joined with the shift recorded in the table.

use bitflags::bitflags;
use serde::{Serialize, Serializer};

use crate::constants::EC3K_FRAME_LEN;
use crate::ec3k::crc::calc_ec3k_crc;
use crate::ec3k::framer::FrameBytes;
use crate::error::Ec3kError;

/// Widest field [`extract_nibbles`] can return.
pub const MAX_FIELD_NIBBLES: usize = 16;

/// Named fields of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    TimeTotalLow,
    Pad1,
    TimeOnLow,
    Pad2,
    EnergyLow,
    PowerCurrent,
    PowerMax,
    Internal,
    TimeTotalHigh,
    Pad3,
    EnergyHigh,
    TimeOnHigh,
    ResetCounter,
    Flags,
    Pad4,
    CrcReceived,
}

/// Where a field lives and how its raw value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub field: Field,
    pub name: &'static str,
    /// First nibble index.
    pub start: usize,
    /// Width in nibbles.
    pub width: usize,
    /// Left shift applied when the field is joined into a composite value.
    pub shift: u32,
    /// Multiplier converting the raw value to its unit, if any.
    pub scale: Option<f64>,
    /// Bytes of the value are stored least significant first.
    pub little_endian: bool,
}

const fn spec(field: Field, name: &'static str, start: usize, width: usize) -> FieldSpec {
    FieldSpec {
        field,
        name,
        start,
        width,
        shift: 0,
        scale: None,
        little_endian: false,
    }
}

const fn shifted(mut s: FieldSpec, shift: u32) -> FieldSpec {
    s.shift = shift;
    s
}

const fn scaled(mut s: FieldSpec, scale: f64) -> FieldSpec {
    s.scale = Some(scale);
    s
}

const fn little_endian(mut s: FieldSpec) -> FieldSpec {
    s.little_endian = true;
    s
}

/// The frame layout. Nibble 0 and nibbles 45..=58 carry nothing we decode.
pub static LAYOUT: [FieldSpec; 17] = [
    spec(Field::Id, "id", 1, 4),
    spec(Field::TimeTotalLow, "time_total_low", 5, 4),
    spec(Field::Pad1, "pad_1", 9, 4),
    spec(Field::TimeOnLow, "time_on_low", 13, 4),
    spec(Field::Pad2, "pad_2", 17, 7),
    spec(Field::EnergyLow, "energy_low", 24, 7),
    scaled(spec(Field::PowerCurrent, "power_current", 31, 4), 0.1),
    scaled(spec(Field::PowerMax, "power_max", 35, 4), 0.1),
    spec(Field::Internal, "internal", 39, 6),
    shifted(spec(Field::TimeTotalHigh, "time_total_high", 59, 3), 16),
    spec(Field::Pad3, "pad_3", 62, 5),
    shifted(spec(Field::EnergyHigh, "energy_high", 67, 4), 28),
    shifted(spec(Field::TimeOnHigh, "time_on_high", 71, 3), 16),
    spec(Field::ResetCounter, "reset_counter", 74, 2),
    spec(Field::Flags, "flags", 76, 1),
    spec(Field::Pad4, "pad_4", 77, 1),
    little_endian(spec(Field::CrcReceived, "crc_received", 78, 4)),
];

/// The padding groups that must read as zero in a valid frame.
pub const PADDING_FIELDS: [Field; 4] = [Field::Pad1, Field::Pad2, Field::Pad3, Field::Pad4];

impl Field {
    /// Layout entry for this field.
    pub fn spec(self) -> &'static FieldSpec {
        // LAYOUT is ordered like the enum
        &LAYOUT[self as usize]
    }
}

impl FieldSpec {
    /// Raw value of the field, byte order normalised.
    pub fn read(&self, frame: &[u8]) -> Result<u64, Ec3kError> {
        let value = extract_nibbles(frame, self.start, self.width)?;
        Ok(if self.little_endian {
            swap_nibble_pairs(value, self.width)
        } else {
            value
        })
    }

    /// Raw value shifted into its place within a composite value.
    pub fn read_shifted(&self, frame: &[u8]) -> Result<u64, Ec3kError> {
        Ok(self.read(frame)? << self.shift)
    }

    /// Raw value converted to its unit.
    pub fn read_scaled(&self, frame: &[u8]) -> Result<f64, Ec3kError> {
        Ok(self.apply_scale(self.read(frame)?))
    }

    /// Convert an already-read raw value to its unit.
    pub fn apply_scale(&self, raw: u64) -> f64 {
        let raw = raw as f64;
        self.scale.map_or(raw, |scale| raw * scale)
    }

    /// Store `value` into the field (the inverse of [`FieldSpec::read`]).
    pub fn write(&self, frame: &mut [u8], value: u64) -> Result<(), Ec3kError> {
        let stored = if self.little_endian {
            check_width(value, self.width)?;
            swap_nibble_pairs(value, self.width)
        } else {
            value
        };
        insert_nibbles(frame, self.start, self.width, stored)
    }
}

/// Reverse the byte order of a value spanning `width` nibbles.
fn swap_nibble_pairs(value: u64, width: usize) -> u64 {
    let bytes = width / 2;
    (0..bytes).fold(0u64, |acc, i| {
        let byte = (value >> (8 * i)) & 0xFF;
        acc | (byte << (8 * (bytes - 1 - i)))
    })
}

fn check_range(frame: &[u8], start: usize, width: usize) -> Result<(), Ec3kError> {
    let available = frame.len() * 2;
    match start.checked_add(width) {
        Some(end) if end <= available && width <= MAX_FIELD_NIBBLES => Ok(()),
        _ => Err(Ec3kError::NibbleOutOfRange {
            start,
            width,
            available,
        }),
    }
}

fn check_width(value: u64, width: usize) -> Result<(), Ec3kError> {
    if width < MAX_FIELD_NIBBLES && value >> (4 * width) != 0 {
        return Err(Ec3kError::ValueTooWide { value, width });
    }
    Ok(())
}

#[inline]
fn nibble_at(frame: &[u8], index: usize) -> u8 {
    let byte = frame[index / 2];
    if index % 2 == 0 {
        byte >> 4
    } else {
        byte & 0x0F
    }
}

/// Read `width` nibbles starting at nibble `start`, most significant first.
pub fn extract_nibbles(frame: &[u8], start: usize, width: usize) -> Result<u64, Ec3kError> {
    check_range(frame, start, width)?;
    Ok((start..start + width).fold(0u64, |acc, i| (acc << 4) | u64::from(nibble_at(frame, i))))
}

/// Write `value` into `width` nibbles starting at nibble `start`.
pub fn insert_nibbles(
    frame: &mut [u8],
    start: usize,
    width: usize,
    value: u64,
) -> Result<(), Ec3kError> {
    check_range(frame, start, width)?;
    check_width(value, width)?;
    for (k, index) in (start..start + width).enumerate() {
        let nibble = ((value >> (4 * (width - 1 - k))) & 0x0F) as u8;
        let byte = &mut frame[index / 2];
        *byte = if index % 2 == 0 {
            (*byte & 0x0F) | (nibble << 4)
        } else {
            (*byte & 0xF0) | nibble
        };
    }
    Ok(())
}

bitflags! {
    /// Status bits carried in the flags nibble.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct DeviceFlags: u8 {
        /// The attached load is currently drawing power.
        const DRAWING_POWER = 0b0001;

        const _ = !0;
    }
}

fn serialize_flags<S: Serializer>(flags: &DeviceFlags, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(flags.bits())
}

/// Every field of one frame, plus the received and computed CRC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFields {
    pub id: u16,
    /// Seconds since the transmitter was first powered.
    pub time_total_s: u32,
    /// Seconds the attached load has been switched on.
    pub time_on_s: u32,
    /// Cumulative energy in watt-seconds, from the split nibble fields.
    pub energy_ws: u64,
    /// Cumulative energy in watt-seconds, from the byte-positional formula.
    pub energy_ws_bytewise: u64,
    /// Instantaneous power in tenths of a watt.
    pub power_current_raw: u16,
    /// Maximum power seen, in tenths of a watt.
    pub power_max_raw: u16,
    pub internal: u32,
    pub reset_counter: u8,
    #[serde(serialize_with = "serialize_flags")]
    pub flags: DeviceFlags,
    /// `pad_1` through `pad_4`.
    pub padding: [u64; 4],
    pub crc_received: u16,
    pub crc_computed: u16,
}

impl DecodedFields {
    /// Decode every field of a complete frame.
    pub fn from_frame(frame: &FrameBytes) -> Result<Self, Ec3kError> {
        let bytes = frame.as_bytes().as_slice();
        let read = |field: Field| field.spec().read(bytes);
        let join = |low: Field, high: Field| -> Result<u64, Ec3kError> {
            Ok(low.spec().read_shifted(bytes)? | high.spec().read_shifted(bytes)?)
        };

        let mut padding = [0u64; 4];
        for (slot, field) in padding.iter_mut().zip(PADDING_FIELDS) {
            *slot = read(field)?;
        }

        Ok(Self {
            id: read(Field::Id)? as u16,
            time_total_s: join(Field::TimeTotalLow, Field::TimeTotalHigh)? as u32,
            time_on_s: join(Field::TimeOnLow, Field::TimeOnHigh)? as u32,
            energy_ws: join(Field::EnergyLow, Field::EnergyHigh)?,
            energy_ws_bytewise: energy_bytewise(frame.as_bytes()),
            power_current_raw: read(Field::PowerCurrent)? as u16,
            power_max_raw: read(Field::PowerMax)? as u16,
            internal: read(Field::Internal)? as u32,
            reset_counter: read(Field::ResetCounter)? as u8,
            flags: DeviceFlags::from_bits_retain(read(Field::Flags)? as u8),
            padding,
            crc_received: read(Field::CrcReceived)? as u16,
            crc_computed: calc_ec3k_crc(frame.crc_region()),
        })
    }

    /// Instantaneous power in watts.
    pub fn power_w(&self) -> f64 {
        Field::PowerCurrent
            .spec()
            .apply_scale(u64::from(self.power_current_raw))
    }

    /// Maximum power in watts.
    pub fn power_max_w(&self) -> f64 {
        Field::PowerMax
            .spec()
            .apply_scale(u64::from(self.power_max_raw))
    }

    /// Cumulative energy in kWh.
    pub fn energy_kwh(&self) -> f64 {
        self.energy_ws as f64 / (1000.0 * 3600.0)
    }

    pub fn drawing_power(&self) -> bool {
        self.flags.contains(DeviceFlags::DRAWING_POWER)
    }

    /// All four padding groups read as zero.
    pub fn padding_clear(&self) -> bool {
        self.padding.iter().all(|&pad| pad == 0)
    }

    pub fn crc_matches(&self) -> bool {
        self.crc_received == self.crc_computed
    }
}

/// Energy assembled from fixed byte positions; spans the same nibbles as
/// `energy_low`/`energy_high`.
fn energy_bytewise(b: &[u8; EC3K_FRAME_LEN]) -> u64 {
    let high = (u64::from(b[33] & 0x0F) << 12) | (u64::from(b[34]) << 4) | (u64::from(b[35]) >> 4);
    (high << 28)
        | (u64::from(b[12]) << 20)
        | (u64::from(b[13]) << 12)
        | (u64::from(b[14]) << 4)
        | (u64::from(b[15]) >> 4)
}

/// Assembles a valid frame from field values. Used to synthesise test
/// signals and by the CLI `encode` command.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    id: u16,
    time_total_s: u32,
    time_on_s: u32,
    energy_ws: u64,
    power_current_raw: u16,
    power_max_raw: u16,
    internal: u32,
    reset_counter: u8,
    flags: DeviceFlags,
    padding: [u64; 4],
}

impl FrameBuilder {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn time_total(mut self, seconds: u32) -> Self {
        self.time_total_s = seconds;
        self
    }

    pub fn time_on(mut self, seconds: u32) -> Self {
        self.time_on_s = seconds;
        self
    }

    pub fn energy_ws(mut self, ws: u64) -> Self {
        self.energy_ws = ws;
        self
    }

    /// Instantaneous power in tenths of a watt.
    pub fn power_raw(mut self, tenths: u16) -> Self {
        self.power_current_raw = tenths;
        self
    }

    /// Maximum power in tenths of a watt.
    pub fn power_max_raw(mut self, tenths: u16) -> Self {
        self.power_max_raw = tenths;
        self
    }

    pub fn internal(mut self, value: u32) -> Self {
        self.internal = value;
        self
    }

    pub fn reset_counter(mut self, count: u8) -> Self {
        self.reset_counter = count;
        self
    }

    pub fn flags(mut self, flags: DeviceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Force a padding group (0-based) to a non-zero value.
    pub fn padding(mut self, group: usize, value: u64) -> Self {
        if let Some(slot) = self.padding.get_mut(group) {
            *slot = value;
        }
        self
    }

    /// Lay out all fields without the CRC.
    fn layout(&self) -> Result<[u8; EC3K_FRAME_LEN], Ec3kError> {
        let mut frame = [0u8; EC3K_FRAME_LEN];
        let mut put = |field: Field, value: u64| field.spec().write(&mut frame, value);

        put(Field::Id, self.id.into())?;
        put(Field::TimeTotalLow, u64::from(self.time_total_s & 0xFFFF))?;
        put(Field::TimeTotalHigh, u64::from(self.time_total_s >> 16))?;
        put(Field::TimeOnLow, u64::from(self.time_on_s & 0xFFFF))?;
        put(Field::TimeOnHigh, u64::from(self.time_on_s >> 16))?;
        put(Field::EnergyLow, self.energy_ws & 0x0FFF_FFFF)?;
        put(Field::EnergyHigh, self.energy_ws >> 28)?;
        put(Field::PowerCurrent, self.power_current_raw.into())?;
        put(Field::PowerMax, self.power_max_raw.into())?;
        put(Field::Internal, self.internal.into())?;
        put(Field::ResetCounter, self.reset_counter.into())?;
        put(Field::Flags, self.flags.bits().into())?;
        for (field, value) in PADDING_FIELDS.into_iter().zip(self.padding) {
            put(field, value)?;
        }
        Ok(frame)
    }

    /// Build the frame with a correct CRC.
    pub fn build(&self) -> Result<FrameBytes, Ec3kError> {
        let mut frame = self.layout()?;
        let crc = calc_ec3k_crc(&frame[..EC3K_FRAME_LEN - 2]);
        Field::CrcReceived.spec().write(&mut frame, crc.into())?;
        Ok(FrameBytes::new(frame))
    }

    /// Build the frame carrying an arbitrary CRC value.
    pub fn build_with_crc(&self, crc: u16) -> Result<FrameBytes, Ec3kError> {
        let mut frame = self.layout()?;
        Field::CrcReceived.spec().write(&mut frame, crc.into())?;
        Ok(FrameBytes::new(frame))
    }
}
