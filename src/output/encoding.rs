//! Output Encoding
//!
//! CSVライターが出力するUTF-8バイト列を、指定されたエンコーディングに変換しながら
//! 書き込むアダプター。

use encoding_rs::{Encoder, EncoderResult};
use std::io::{self, Write};

use crate::api::TextEncoding;

/// 出力エンコーディングで表現できない文字
#[derive(Debug, thiserror::Error)]
#[error("character {character:?} cannot be encoded as {encoding}")]
pub(crate) struct UnmappableCharacter {
    pub character: char,
    pub encoding: &'static str,
}

/// UTF-8の入力を指定エンコーディングに変換して書き込むライター
///
/// 生成時にBOMを1度だけ書き込みます。チャンク境界で分断されたUTF-8の
/// マルチバイト文字は、次の書き込みまで保留します。
pub(crate) struct EncodedWriter<W: Write> {
    inner: W,
    encoding: TextEncoding,
    encoder: Option<Encoder>,
    /// 未完結のUTF-8バイト列
    pending: Vec<u8>,
    scratch: Vec<u8>,
}

impl<W: Write> EncodedWriter<W> {
    /// BOMを書き込み、ライターを生成する
    pub fn new(mut inner: W, encoding: TextEncoding) -> io::Result<Self> {
        inner.write_all(encoding.bom())?;

        let encoder = match encoding {
            TextEncoding::Legacy(legacy) => Some(legacy.new_encoder()),
            _ => None,
        };

        Ok(Self {
            inner,
            encoding,
            encoder,
            pending: Vec::new(),
            scratch: Vec::new(),
        })
    }

    /// 残りを書き出し、内側のライターを返す
    pub fn finish(mut self) -> io::Result<W> {
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "incomplete UTF-8 sequence at end of output",
            ));
        }
        // ISO-2022-JPなど状態を持つエンコーダーの終端処理
        if self.encoder.is_some() {
            self.encode_str("", true)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn encode_str(&mut self, text: &str, last: bool) -> io::Result<()> {
        self.scratch.clear();

        match self.encoding {
            TextEncoding::Utf8 { .. } => self.scratch.extend_from_slice(text.as_bytes()),
            TextEncoding::Utf16 { big_endian, .. } => {
                for unit in text.encode_utf16() {
                    let bytes = if big_endian {
                        unit.to_be_bytes()
                    } else {
                        unit.to_le_bytes()
                    };
                    self.scratch.extend_from_slice(&bytes);
                }
            }
            TextEncoding::Legacy(legacy) => {
                let encoder = self.encoder.get_or_insert_with(|| legacy.new_encoder());
                encode_legacy(encoder, text, last, &mut self.scratch)?;
            }
        }

        self.inner.write_all(&self.scratch)
    }
}

impl<W: Write> Write for EncodedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let TextEncoding::Utf8 { .. } = self.encoding {
            self.inner.write_all(buf)?;
            return Ok(buf.len());
        }

        let mut pending = std::mem::take(&mut self.pending);
        pending.extend_from_slice(buf);

        let valid_len = match std::str::from_utf8(&pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };

        let text = std::str::from_utf8(&pending[..valid_len])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.encode_str(text, false)?;

        pending.drain(..valid_len);
        self.pending = pending;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `encoding_rs`で置換なしにエンコードする
fn encode_legacy(
    encoder: &mut Encoder,
    text: &str,
    last: bool,
    dst: &mut Vec<u8>,
) -> io::Result<()> {
    let mut remaining = text;
    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(remaining.len())
            .unwrap_or(remaining.len() * 4 + 16);
        dst.reserve(needed);

        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, dst, last);
        remaining = &remaining[read..];

        match result {
            EncoderResult::InputEmpty => return Ok(()),
            EncoderResult::OutputFull => continue,
            EncoderResult::Unmappable(character) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    UnmappableCharacter {
                        character,
                        encoding: encoder.encoding().name(),
                    },
                ))
            }
        }
    }
}
