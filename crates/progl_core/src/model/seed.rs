//! Fixed catalog of programming languages used to seed the table.

use super::record::{Record, RecordId};

/// Id of the record removed by the demo delete step.
pub const DELPHI_ID: RecordId = 16;

const SEED_ROWS: &[(RecordId, &str, &str, &str)] = &[
    (1, "Kenneth E. Iverson", "APL", "1966-11-27"),
    (2, "Thomas E. Kurz", "BASIC", "1964-05-01"),
    (3, "Charles H. Moore", "FORTH", "1970-01-01"),
    (4, "Robin Milner", "ML", "1973-01-01"),
    (5, "Donald D. Chamberlin", "SQL", "1974-01-01"),
    (
        6,
        "Alfred Aho, Peter Weinberg, Brian Kernighan",
        "AWK",
        "1977-01-01",
    ),
    (
        7,
        "John Warnock, Chuck Geschke, Doug Brotz, Ed Taft, Bill Paxton",
        "PostScript",
        "1982-01-01",
    ),
    (8, "Bjarne Stroustrup", "C++", "1985-01-01"),
    (9, "Bertrand Meyer", "Eiffel", "1986-01-01"),
    (10, "Tom Love and Brad Cox", "Objective-C", "1984-01-01"),
    (11, "Larry Wall", "Perl", "1987-12-18"),
    (
        12,
        "Lennart Augustsson, Dave Barton, Brian Boutel, Warren Burton, Joseph Fasel, \
         Kevin Hammond, Ralf Hinze, Paul Hudak, John Hughes, Thomas Johnsson, Mark Jones, \
         Simon Peyton Jones, John Launchbury, Erik Meijer, John Peterson, Alastair Reid, \
         Colin Runciman, Philip Wadler",
        "Haskell",
        "1990-01-01",
    ),
    (13, "Guido van Rossum", "Python", "1991-02-01"),
    (
        14,
        "Roberto Ierusalimschy, Waldemar Celes, Luiz Henrique de Figueiredo",
        "Lua",
        "1993-01-01",
    ),
    (15, "James Gosling", "Java", "1995-05-23"),
    (
        DELPHI_ID,
        "Larry Tesler (Apple), Niklaus Wirth (for Apple), Anders Hejlsberg (Borland)",
        "Delphi",
        "1986-01-01",
    ),
];

/// Returns the 16 seed records, ids `1..=16`.
pub fn seed_records() -> Vec<Record> {
    SEED_ROWS
        .iter()
        .map(|(id, conceptor, language, date)| Record::new(*id, *conceptor, *language, *date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{seed_records, DELPHI_ID};

    #[test]
    fn seed_catalog_has_sixteen_valid_unique_records() {
        let records = seed_records();
        assert_eq!(records.len(), 16);
        for (index, record) in records.iter().enumerate() {
            assert_eq!(record.id, index as i64 + 1);
            record.validate().unwrap();
        }
        assert_eq!(records.last().unwrap().id, DELPHI_ID);
        assert_eq!(records.last().unwrap().language.as_deref(), Some("Delphi"));
    }
}
