use chrono::NaiveDate;
use log::{debug, warn};
use quick_xml::{Error, Reader};
use quick_xml::events::{BytesStart, Event};
use rates_model::{DailyRate, Rates};

const CUBE: &[u8] = b"Cube";

/// A dated `Cube` currently being read.
struct OpenBlock {
    date: NaiveDate,
    rates: Rates,
    // nested elements still open below the dated cube
    depth: usize,
}

impl OpenBlock {
    fn finish(self) -> Option<DailyRate> {
        if self.rates.is_empty() {
            debug!("parse_ecb_xml | empty block skipped | date: {}", self.date);
            return None;
        }
        Some(DailyRate::new(self.date, self.rates))
    }
}

/// Extracts dated rate blocks from an ECB eurofxref document, in document order.
///
/// Blocks without any usable `currency`/`rate` leaf produce no record. An
/// ill-formed tag drops the block it occurs in and scanning carries on with the
/// next one. Any other XML error ends the scan with the records read so far.
pub fn parse_ecb_xml(xml: &str) -> Vec<DailyRate> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut block: Option<OpenBlock> = None;
    let mut last_error_at = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match block.as_mut() {
                Some(open) => {
                    open.depth += 1;
                    collect_rate(&e, &mut open.rates);
                }
                None => {
                    block = block_date(&e).map(|date| OpenBlock {
                        date,
                        rates: Rates::new(),
                        depth: 0,
                    });
                }
            },
            Ok(Event::Empty(e)) => {
                if let Some(open) = block.as_mut() {
                    collect_rate(&e, &mut open.rates);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(open) = block.as_mut() {
                    if open.depth > 0 {
                        open.depth -= 1;
                        continue;
                    }
                }
                if let Some(record) = block.take().and_then(OpenBlock::finish) {
                    records.push(record);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(Error::IllFormed(e)) => {
                let position = reader.buffer_position();
                // the reader must move on between errors, otherwise give up
                if last_error_at == Some(position) {
                    warn!("parse_ecb_xml | stuck at byte {}: {}", position, e);
                    break;
                }
                last_error_at = Some(position);
                if let Some(dropped) = block.take() {
                    warn!(
                        "parse_ecb_xml | ill-formed block dropped | date: {} | byte {}: {}",
                        dropped.date, position, e
                    );
                } else {
                    warn!("parse_ecb_xml | ill-formed xml at byte {}: {}", position, e);
                }
            }
            Err(e) => {
                warn!(
                    "parse_ecb_xml | malformed xml at byte {}: {} | keeping {} records",
                    reader.buffer_position(),
                    e,
                    records.len()
                );
                break;
            }
        }
    }

    records
}

fn block_date(e: &BytesStart) -> Option<NaiveDate> {
    if e.local_name().as_ref() != CUBE {
        return None;
    }
    let time = attribute(e, "time")?;
    if !is_iso_date(&time) {
        return None;
    }
    NaiveDate::parse_from_str(&time, "%Y-%m-%d").ok()
}

fn collect_rate(e: &BytesStart, rates: &mut Rates) {
    if e.local_name().as_ref() != CUBE {
        return;
    }
    let (Some(currency), Some(rate)) = (attribute(e, "currency"), attribute(e, "rate")) else {
        return;
    };
    if !is_currency_code(&currency) || !is_decimal(&rate) {
        return;
    }
    if let Ok(value) = rate.parse::<f64>() {
        rates.insert(currency, value);
    }
}

fn attribute(e: &BytesStart, name: &str) -> Option<String> {
    let attr = e.try_get_attribute(name).ok().flatten()?;
    attr.unescape_value().ok().map(|value| value.into_owned())
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn is_currency_code(value: &str) -> bool {
    value.len() == 3 && value.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_decimal(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}
