use std::{io, path::Path};

use ::csv::{ReaderBuilder, StringRecord, Trim};
use itertools::Itertools;

use super::{fold_key, Categories, Record, SourceError};

const NAME: &str = "Retail Accounts";
const ADDRESS: &str = "Address";
const CITY: &str = "City";
const STATE: &str = "State";
const ZIP: &str = "Zip Code";

// exports from different distributors disagree on this one
const MARKET_TYPES: &[&str] = &[
    "Market Type",
    "Market_Type",
    "MarketType",
    "Market",
    "Premise Type",
    "Channel",
    "Class of Trade",
];

pub fn read(path: &Path, categories: &Categories) -> Result<Vec<Record>, SourceError> {
    let file = std::fs::File::open(path).map_err(::csv::Error::from)?;
    parse(file, categories)
}

pub fn parse<R: io::Read>(input: R, categories: &Categories) -> Result<Vec<Record>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let columns = Columns::find(reader.headers()?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let name = columns.get(&row, Some(columns.name));
        if name.is_empty() {
            continue;
        }

        records.push(Record {
            customer_name: name.to_string(),
            raw_address: columns.address(&row),
            customer_type: categories.categorize(columns.get(&row, columns.market)),
        });
    }

    Ok(records)
}

struct Columns {
    name: usize,
    address: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    zip: Option<usize>,
    market: Option<usize>,
}

impl Columns {
    fn find(headers: &StringRecord) -> Result<Self, SourceError> {
        let position = |name: &str| {
            let name = fold_key(name);
            headers.iter().position(|x| fold_key(x) == name)
        };

        Ok(Self {
            name: position(NAME).ok_or(SourceError::MissingColumn(NAME))?,
            address: position(ADDRESS),
            city: position(CITY),
            state: position(STATE),
            zip: position(ZIP),
            market: MARKET_TYPES.iter().find_map(|x| position(x)),
        })
    }

    fn get<'a>(&self, row: &'a StringRecord, column: Option<usize>) -> &'a str {
        column.and_then(|x| row.get(x)).unwrap_or_default()
    }

    /// `street, city, state zip`, skipping blanks. No street means no address.
    fn address(&self, row: &StringRecord) -> Option<String> {
        let street = self.get(row, self.address);
        if street.is_empty() {
            return None;
        }

        let zip = zip(self.get(row, self.zip));
        let region = [self.get(row, self.state), zip.as_str()]
            .into_iter()
            .filter(|x| !x.is_empty())
            .join(" ");

        let address = [street, self.get(row, self.city), region.as_str()]
            .into_iter()
            .filter(|x| !x.is_empty())
            .join(", ");
        Some(address)
    }
}

/// ZIP+4 is cut to five digits, anything else that isn't five digits is dropped.
fn zip(raw: &str) -> String {
    let zip: String = raw.chars().take(5).collect();
    if zip.len() == 5 && zip.chars().all(|x| x.is_ascii_digit()) {
        zip
    } else {
        String::new()
    }
}
