//! Color flag table parser.
//!
//! The table has integer `season` and `episode` columns, an optional
//! `youtube_src` column, and one `0`/`1` column per pigment. Pigment
//! columns are translated to canonical color names through [`PALETTE`];
//! any other column is ignored, flagged or not.

use crate::error::{Error, Result, SkipReason};
use crate::models::{ColorRecord, Parsed, Pigment};

const SOURCE: &str = "colors";

/// Pigment columns of the color table and their canonical colors.
pub const PALETTE: &[Pigment] = &[
    Pigment { column: "Alizarin_Crimson", name: "Alizarin Crimson", hex_code: "#4E1500" },
    Pigment { column: "Black_Gesso", name: "Black Gesso", hex_code: "#000000" },
    Pigment { column: "Bright_Red", name: "Bright Red", hex_code: "#DB0000" },
    Pigment { column: "Burnt_Umber", name: "Burnt Umber", hex_code: "#8A3324" },
    Pigment { column: "Cadmium_Yellow", name: "Cadmium Yellow", hex_code: "#FFEC00" },
    Pigment { column: "Dark_Sienna", name: "Dark Sienna", hex_code: "#5F2E1F" },
    Pigment { column: "Indian_Red", name: "Indian Red", hex_code: "#CD5C5C" },
    Pigment { column: "Indian_Yellow", name: "Indian Yellow", hex_code: "#FFB800" },
    Pigment { column: "Liquid_Black", name: "Liquid Black", hex_code: "#000000" },
    Pigment { column: "Liquid_Clear", name: "Liquid Clear", hex_code: "#FFFFFF" },
    Pigment { column: "Midnight_Black", name: "Midnight Black", hex_code: "#000000" },
    Pigment { column: "Phthalo_Blue", name: "Phthalo Blue", hex_code: "#0C0040" },
    Pigment { column: "Phthalo_Green", name: "Phthalo Green", hex_code: "#102E3C" },
    Pigment { column: "Prussian_Blue", name: "Prussian Blue", hex_code: "#021E44" },
    Pigment { column: "Sap_Green", name: "Sap Green", hex_code: "#0A3410" },
    Pigment { column: "Titanium_White", name: "Titanium White", hex_code: "#FFFFFF" },
    Pigment { column: "Van_Dyke_Brown", name: "Van Dyke Brown", hex_code: "#221B15" },
    Pigment { column: "Yellow_Ochre", name: "Yellow Ochre", hex_code: "#C79B00" },
];

pub fn pigment_for_column(column: &str) -> Option<&'static Pigment> {
    PALETTE.iter().find(|p| p.column == column)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

pub fn parse_color_table(input: impl AsRef<[u8]>) -> Result<Parsed<ColorRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_ref());

    let headers = reader.headers()?.clone();
    let season_idx = find_column(&headers, "season").ok_or(Error::MissingColumn {
        table: SOURCE,
        column: "season",
    })?;
    let episode_idx = find_column(&headers, "episode").ok_or(Error::MissingColumn {
        table: SOURCE,
        column: "episode",
    })?;
    let video_idx = find_column(&headers, "youtube_src");

    let pigment_columns: Vec<(usize, &'static Pigment)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| pigment_for_column(h).map(|p| (i, p)))
        .collect();

    let needed = pigment_columns
        .iter()
        .map(|(i, _)| *i)
        .chain([season_idx, episode_idx])
        .chain(video_idx)
        .max()
        .map_or(0, |max| max + 1);

    let mut parsed = Parsed::new();

    for (row_idx, result) in reader.records().enumerate() {
        let fallback_line = row_idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line() as usize);
                parsed.skip(SOURCE, line, SkipReason::Unreadable(e.to_string()));
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line() as usize);

        if record.len() < needed {
            parsed.skip(
                SOURCE,
                line,
                SkipReason::ShortRow {
                    found: record.len(),
                    needed,
                },
            );
            continue;
        }

        let season = match parse_int("season", &record[season_idx]) {
            Ok(v) => v,
            Err(reason) => {
                parsed.skip(SOURCE, line, reason);
                continue;
            }
        };
        let episode = match parse_int("episode", &record[episode_idx]) {
            Ok(v) => v,
            Err(reason) => {
                parsed.skip(SOURCE, line, reason);
                continue;
            }
        };

        let colors = pigment_columns
            .iter()
            .filter(|(idx, _)| &record[*idx] == "1")
            .map(|(_, pigment)| *pigment)
            .collect();

        let youtube_src = video_idx
            .map(|idx| &record[idx])
            .filter(|src| !src.is_empty())
            .map(str::to_string);

        parsed.records.push(ColorRecord {
            season,
            episode,
            colors,
            youtube_src,
        });
    }

    Ok(parsed)
}

fn parse_int(column: &'static str, value: &str) -> std::result::Result<i64, SkipReason> {
    value.parse().map_err(|_| SkipReason::NotInteger {
        column,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(record: &ColorRecord) -> Vec<&'static str> {
        record.colors.iter().map(|p| p.name).collect()
    }

    const HEADER: &str = ",painting_index,img_src,painting_title,season,episode,num_colors,youtube_src,colors,color_hex,Black_Gesso,Bright_Red,Burnt_Umber,Titanium_White";

    #[test]
    fn test_flagged_pigments_translated() {
        let text = format!(
            "{}\n0,282,x.png,A Walk in the Woods,1,1,2,https://www.youtube.com/embed/oh5p5f5_-7A,\"['Bright Red', 'Titanium White']\",\"['#DB0000', '#FFFFFF']\",0,1,0,1\n",
            HEADER
        );
        let parsed = parse_color_table(&text).unwrap();
        assert!(parsed.skipped.is_empty());
        let rec = &parsed.records[0];
        assert_eq!((rec.season, rec.episode), (1, 1));
        assert_eq!(names(rec), vec!["Bright Red", "Titanium White"]);
        assert_eq!(
            rec.youtube_src.as_deref(),
            Some("https://www.youtube.com/embed/oh5p5f5_-7A")
        );
    }

    #[test]
    fn test_untranslated_columns_ignored_even_if_flagged() {
        let text = "season,episode,Mystery_Pigment,Sap_Green\n2,3,1,1\n";
        let parsed = parse_color_table(text).unwrap();
        assert_eq!(names(&parsed.records[0]), vec!["Sap Green"]);
        assert_eq!(parsed.records[0].youtube_src, None);
    }

    #[test]
    fn test_non_integer_season_skipped() {
        let text = "season,episode,Sap_Green\nseven,3,1\n4,x,1\n4,5,1\n";
        let parsed = parse_color_table(text).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(
            parsed.skipped[0].reason,
            SkipReason::NotInteger {
                column: "season",
                value: "seven".to_string()
            }
        );
        assert_eq!(parsed.skipped[1].line, 3);
    }

    #[test]
    fn test_short_row_skipped() {
        let text = "season,episode,Sap_Green,Yellow_Ochre\n1,2,1\n";
        let parsed = parse_color_table(text).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(
            parsed.skipped[0].reason,
            SkipReason::ShortRow { found: 3, needed: 4 }
        );
    }

    #[test]
    fn test_row_without_flags_still_emitted() {
        let text = "season,episode,Sap_Green\n1,2,0\n";
        let parsed = parse_color_table(text).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.records[0].colors.is_empty());
    }

    #[test]
    fn test_missing_season_column_is_an_error() {
        let err = parse_color_table("episode,Sap_Green\n1,1\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column: "season", .. }));
    }

    #[test]
    fn test_palette_columns_unique() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a.column, b.column);
                assert_ne!(a.name, b.name);
            }
        }
    }
}
