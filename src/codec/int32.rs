//! Int32 compressed data packets.
//!
//! An i32 sequence is residual-transformed by a predictor agreed per field
//! (the predictor is never written to the stream), then framed by a codec
//! kind byte. The write path always emits the uncompressed kind; the read
//! path additionally understands the bit-length kind. Huffman and
//! arithmetic kinds exist in the framing but are rejected.
//!
//! The first four values of a sequence always pass through untransformed.
//! Residuals are computed against the original values on encode and
//! against the already-reconstructed values on decode; all arithmetic
//! wraps.

use crate::codec::bits::BitReader;
use crate::io::{self, ByteCursor};
use crate::util::{Error, Result};

const CODEC_NULL: u8 = 0;
const CODEC_BITLENGTH: u8 = 1;
const CODEC_HUFFMAN: u8 = 2;
const CODEC_ARITHMETIC: u8 = 3;

/// Residual transform applied before framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predictor {
    Lag1 = 0,
    Lag2 = 1,
    Stride1 = 2,
    Stride2 = 3,
    StripIndex = 4,
    Ramp = 5,
    Xor1 = 6,
    Xor2 = 7,
    Null = 8,
}

impl Predictor {
    #[inline]
    fn is_xor(self) -> bool {
        matches!(self, Predictor::Xor1 | Predictor::Xor2)
    }
}

/// Prediction for element `index` (>= 4) from its predecessors.
fn predict(values: &[i32], index: usize, predictor: Predictor) -> i32 {
    let v1 = values[index - 1];
    let v2 = values[index - 2];
    let v4 = values[index - 4];
    match predictor {
        Predictor::Lag1 | Predictor::Xor1 => v1,
        Predictor::Lag2 | Predictor::Xor2 => v2,
        Predictor::Stride1 => v1.wrapping_add(v1.wrapping_sub(v2)),
        Predictor::Stride2 => v2.wrapping_add(v2.wrapping_sub(v4)),
        Predictor::StripIndex => {
            let delta = v2.wrapping_sub(v4);
            if delta < 8 && delta > -8 {
                v2.wrapping_add(delta)
            } else {
                v2.wrapping_add(2)
            }
        }
        Predictor::Ramp => index as i32,
        Predictor::Null => unreachable!("null predictor never predicts"),
    }
}

/// Replace values with residuals against their predictions.
fn pack(values: &[i32], predictor: Predictor) -> Vec<i32> {
    if predictor == Predictor::Null {
        return values.to_vec();
    }
    let mut out = Vec::with_capacity(values.len());
    for (i, &v) in values.iter().enumerate() {
        if i < 4 {
            out.push(v);
        } else {
            let p = predict(values, i, predictor);
            out.push(if predictor.is_xor() { v ^ p } else { v.wrapping_sub(p) });
        }
    }
    out
}

/// Rebuild values from residuals; predictions come from the rebuilt prefix.
fn unpack(residuals: &[i32], predictor: Predictor) -> Vec<i32> {
    if predictor == Predictor::Null {
        return residuals.to_vec();
    }
    let mut out = Vec::with_capacity(residuals.len());
    for (i, &r) in residuals.iter().enumerate() {
        if i < 4 {
            out.push(r);
        } else {
            let p = predict(&out, i, predictor);
            out.push(if predictor.is_xor() { r ^ p } else { r.wrapping_add(p) });
        }
    }
    out
}

/// Encode a sequence with the uncompressed codec kind.
pub fn encode(values: &[i32], predictor: Predictor) -> Vec<u8> {
    let packed = pack(values, predictor);
    let mut buf = Vec::with_capacity(encoded_len(values.len()));
    io::put_u8(&mut buf, CODEC_NULL);
    io::put_vec_i32(&mut buf, &packed);
    buf
}

/// Byte length [`encode`] will produce for `count` values.
#[inline]
pub fn encoded_len(count: usize) -> usize {
    1 + io::vec32_len(count)
}

/// Decode a packet; `predictor` must match the field's agreed transform.
pub fn decode(cur: &mut ByteCursor, predictor: Predictor) -> Result<Vec<i32>> {
    let codec = cur.read_u8()?;
    let residuals = match codec {
        CODEC_NULL => cur.read_vec_i32()?,
        CODEC_BITLENGTH => {
            let code_text_bits = cur.read_i32()?;
            let value_count = cur.read_i32()?;
            let word_count = cur.read_i32()?;
            if code_text_bits < 0 || value_count < 0 || word_count < 0 {
                return Err(Error::invalid("negative bit-length packet field"));
            }
            if code_text_bits as usize > word_count as usize * 32 {
                return Err(Error::invalid("code-text bit length exceeds word data"));
            }
            let mut code_text = Vec::with_capacity(word_count as usize * 4);
            for _ in 0..word_count {
                let word = cur.read_u32_be()?;
                code_text.extend_from_slice(&word.to_be_bytes());
            }
            bitlength_decode(&code_text, value_count as usize)?
        }
        CODEC_HUFFMAN => return Err(Error::NotImplemented("Huffman integer codec")),
        CODEC_ARITHMETIC => return Err(Error::NotImplemented("arithmetic integer codec")),
        other => return Err(Error::invalid(format!("unknown integer codec kind {other}"))),
    };
    Ok(unpack(&residuals, predictor))
}

/// Variable-width symbol decoder for the bit-length codec.
///
/// The code text is a chunk stream: a 0 prefix bit introduces a symbol at
/// the current field width (width 0 consumes nothing and yields 0), a 1
/// prefix introduces a width step of -2 (next bit 0) or +2 (next bit 1).
fn bitlength_decode(code_text: &[u8], value_count: usize) -> Result<Vec<i32>> {
    let mut reader = BitReader::new(code_text);
    let mut width: i32 = 0;
    let mut out = Vec::with_capacity(value_count);
    while out.len() < value_count {
        if reader.read_bits(1)? == 0 {
            if width <= 0 {
                out.push(0);
            } else {
                out.push(reader.read_signed(width as u32)?);
            }
        } else if reader.read_bits(1)? == 0 {
            width -= 2;
        } else {
            width += 2;
            if width > 32 {
                return Err(Error::invalid("bit-length field width exceeds 32"));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::bits::BitWriter;
    use crate::io::Endian;

    const ALL_PREDICTORS: [Predictor; 9] = [
        Predictor::Lag1,
        Predictor::Lag2,
        Predictor::Stride1,
        Predictor::Stride2,
        Predictor::StripIndex,
        Predictor::Ramp,
        Predictor::Xor1,
        Predictor::Xor2,
        Predictor::Null,
    ];

    fn round_trip(values: &[i32], predictor: Predictor) -> Vec<i32> {
        let bytes = encode(values, predictor);
        assert_eq!(bytes.len(), encoded_len(values.len()));
        let mut cur = ByteCursor::new(&bytes, Endian::Little);
        let out = decode(&mut cur, predictor).unwrap();
        assert_eq!(cur.remaining(), 0);
        out
    }

    #[test]
    fn test_round_trip_every_predictor() {
        let values = [0, 3, 6, 9, 12, 2, -5, 100, 101, 102, 0, i32::MAX, i32::MIN];
        for p in ALL_PREDICTORS {
            assert_eq!(round_trip(&values, p), values, "{p:?}");
        }
    }

    #[test]
    fn test_short_arrays_pass_through() {
        for len in 0..4 {
            let values: Vec<i32> = (0..len).map(|i| i * 7 - 3).collect();
            for p in ALL_PREDICTORS {
                let bytes = encode(&values, p);
                // Residual section equals the raw values for short inputs
                let mut expect = vec![CODEC_NULL];
                io::put_vec_i32(&mut expect, &values);
                assert_eq!(bytes, expect, "{p:?} len {len}");
                assert_eq!(round_trip(&values, p), values);
            }
        }
    }

    #[test]
    fn test_stride1_extrapolation() {
        // 0 2 4 6 8 10: perfectly linear, residuals collapse to zero
        let values = [0, 2, 4, 6, 8, 10];
        let packed = pack(&values, Predictor::Stride1);
        assert_eq!(packed, [0, 2, 4, 6, 0, 0]);
        assert_eq!(unpack(&packed, Predictor::Stride1), values);
    }

    #[test]
    fn test_stride2_extrapolation() {
        // Alternating interleaved ramps; stride-2 sees each ramp separately
        let values = [0, 100, 2, 102, 4, 104];
        let packed = pack(&values, Predictor::Stride2);
        // index 4: predict v2 + (v2 - v4) = 2 + (2 - 0) = 4 -> residual 0
        // index 5: predict 102 + (102 - 100) = 104 -> residual 0
        assert_eq!(packed, [0, 100, 2, 102, 0, 0]);
        assert_eq!(unpack(&packed, Predictor::Stride2), values);
    }

    #[test]
    fn test_strip_index_clamp_boundary() {
        // delta = v2 - v4; clamp engages at |delta| >= 8
        // values: [v4, _, v2, _, probe]
        let near = [0, 0, 7, 0, 0]; // delta 7 -> prediction v2 + 7 = 14
        assert_eq!(pack(&near, Predictor::StripIndex)[4], 0 - 14);

        let at = [0, 0, 8, 0, 0]; // delta 8 -> clamped, prediction v2 + 2 = 10
        assert_eq!(pack(&at, Predictor::StripIndex)[4], 0 - 10);

        let neg_near = [0, 0, -7, 0, 0]; // delta -7 -> prediction -14
        assert_eq!(pack(&neg_near, Predictor::StripIndex)[4], 14);

        let neg_at = [0, 0, -8, 0, 0]; // delta -8 -> clamped, prediction -6
        assert_eq!(pack(&neg_at, Predictor::StripIndex)[4], 6);
    }

    #[test]
    fn test_ramp_prediction_is_index() {
        let values = [9, 9, 9, 9, 4, 5, 6];
        let packed = pack(&values, Predictor::Ramp);
        assert_eq!(packed, [9, 9, 9, 9, 0, 0, 0]);
    }

    #[test]
    fn test_xor_residual_is_symmetric() {
        let values = [1, 2, 3, 4, 0xf0f0, 0x0f0f, -77];
        for p in [Predictor::Xor1, Predictor::Xor2] {
            let packed = pack(&values, p);
            assert_eq!(unpack(&packed, p), values);
            // Applying the residual transform twice is not the identity;
            // only pack/unpack pairing is.
            assert_ne!(pack(&packed, p), values);
        }
    }

    #[test]
    fn test_wrapping_arithmetic() {
        let values = [i32::MAX, i32::MAX, i32::MAX, i32::MAX, i32::MIN, i32::MAX];
        for p in ALL_PREDICTORS {
            assert_eq!(round_trip(&values, p), values, "{p:?}");
        }
    }

    #[test]
    fn test_unsupported_codecs_rejected() {
        for codec in [CODEC_HUFFMAN, CODEC_ARITHMETIC] {
            let bytes = [codec, 0, 0, 0, 0];
            let mut cur = ByteCursor::new(&bytes, Endian::Little);
            assert!(matches!(
                decode(&mut cur, Predictor::Null),
                Err(Error::NotImplemented(_))
            ));
        }
        let bytes = [9u8];
        let mut cur = ByteCursor::new(&bytes, Endian::Little);
        assert!(decode(&mut cur, Predictor::Null).is_err());
    }

    #[test]
    fn test_bitlength_packet_decode() {
        // Code text for symbols [0, 0, 5, -2]:
        //   "0"            symbol at width 0 -> 0
        //   "0"            symbol at width 0 -> 0
        //   "11" "11"      width 0 -> 2 -> 4
        //   "0" 0101       symbol 5
        //   "0" 1110       symbol -2
        let mut w = BitWriter::new();
        w.write_bits(0b0, 1);
        w.write_bits(0b0, 1);
        w.write_bits(0b11, 2);
        w.write_bits(0b11, 2);
        w.write_bits(0b0, 1);
        w.write_bits(0b0101, 4);
        w.write_bits(0b0, 1);
        w.write_bits(0b1110, 4);
        let bit_len = w.bit_len();
        let code = w.finish();

        let mut words = code.clone();
        while words.len() % 4 != 0 {
            words.push(0);
        }
        let mut packet = vec![CODEC_BITLENGTH];
        io::put_i32(&mut packet, bit_len as i32);
        io::put_i32(&mut packet, 4); // value count
        io::put_i32(&mut packet, (words.len() / 4) as i32);
        // Words go out big-endian: the packed bytes already are the
        // big-endian representation.
        packet.extend_from_slice(&words);

        let mut cur = ByteCursor::new(&packet, Endian::Little);
        let values = decode(&mut cur, Predictor::Null).unwrap();
        assert_eq!(values, [0, 0, 5, -2]);
    }

    #[test]
    fn test_bitlength_width_decrease() {
        // Raise to width 4, emit 7, drop to width 2, emit -1
        let mut w = BitWriter::new();
        w.write_bits(0b11, 2);
        w.write_bits(0b11, 2);
        w.write_bits(0b0, 1);
        w.write_bits(0b0111, 4);
        w.write_bits(0b10, 2); // width 4 -> 2
        w.write_bits(0b0, 1);
        w.write_bits(0b11, 2);
        let code = w.finish();
        let values = bitlength_decode(&code, 2).unwrap();
        assert_eq!(values, [7, -1]);
    }

    #[test]
    fn test_bitlength_with_predictor() {
        // Symbols are residuals; check the unpack stage runs after decode.
        // Residuals [1, 1, 1, 1, 0] under Lag1 reconstruct to [1,1,1,1,1].
        let mut w = BitWriter::new();
        w.write_bits(0b11, 2); // width 2
        for _ in 0..4 {
            w.write_bits(0b0, 1);
            w.write_bits(0b01, 2);
        }
        w.write_bits(0b0, 1);
        w.write_bits(0b00, 2);
        let bit_len = w.bit_len();
        let mut words = w.finish();
        while words.len() % 4 != 0 {
            words.push(0);
        }

        let mut packet = vec![CODEC_BITLENGTH];
        io::put_i32(&mut packet, bit_len as i32);
        io::put_i32(&mut packet, 5);
        io::put_i32(&mut packet, (words.len() / 4) as i32);
        packet.extend_from_slice(&words);

        let mut cur = ByteCursor::new(&packet, Endian::Little);
        let values = decode(&mut cur, Predictor::Lag1).unwrap();
        assert_eq!(values, [1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_bitlength_truncated_code_text() {
        let packet_head = [CODEC_BITLENGTH, 64, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0];
        let mut cur = ByteCursor::new(&packet_head, Endian::Little);
        assert!(decode(&mut cur, Predictor::Null).is_err());
    }
}
