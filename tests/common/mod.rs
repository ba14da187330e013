//! Shared fixtures: three small source files and a config pointing at them.
//!
//! With `season_size = 2` the listing numbers its five accepted lines
//! S1E1, S1E2, S2E1, S2E2, S3E1. The malformed third line is skipped and
//! does not take a position.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LISTING: &str = r#""A Walk in the Woods" (January 11, 1983)
"Mt. McKinley" (January 18, 1983)
this line is not an episode
"Ebony Sunset" (February 1, 1983)
"Winter Mist" (January 4, 1984)

"Quiet Stream" (March 1, 1984)
"#;

/// S3E1 has no flags at all. S09E09 names an episode the listing never
/// created; `E1` is not a valid code.
pub const SUBJECTS: &str = r#"EPISODE,TITLE,TREE,MOUNTAIN,LAKE,CABIN
S01E01,"""A WALK IN THE WOODS""",1,0,0,0
S01E02,"""MT. MCKINLEY""",1,1,0,1
S02E01,"""EBONY SUNSET""",0,1,0,0
S02E02,"""WINTER MIST""",0,0,1,0
S09E09,"""NOWHERE""",1,0,0,0
E1,"""BROKEN""",1,0,0,0
"#;

/// `x` is not an integer season; 7/7 is not in the catalog.
pub const COLORS: &str = "\
,painting_title,season,episode,youtube_src,Bright_Red,Sap_Green,Titanium_White
0,A Walk in the Woods,1,1,https://www.youtube.com/embed/oh5p5f5_-7A,0,1,1
1,Mt. McKinley,1,2,https://www.youtube.com/embed/RInDWhYceLU,1,0,1
2,Ebony Sunset,2,1,,1,1,0
3,Winter Mist,2,2,https://www.youtube.com/embed/UOziR7PoVco,0,0,1
4,Broken,x,1,,0,0,0
5,Nowhere,7,7,,1,0,0
";

pub struct TestEnv {
    pub tmp: TempDir,
    pub config_path: PathBuf,
}

impl TestEnv {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }
}

pub fn setup_test_env() -> TestEnv {
    setup_test_env_with_bind("127.0.0.1:5000")
}

pub fn setup_test_env_with_bind(bind: &str) -> TestEnv {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(data_dir.join("episode_data.txt"), LISTING).unwrap();
    fs::write(data_dir.join("subject_data.csv"), SUBJECTS).unwrap();
    fs::write(data_dir.join("color_data.csv"), COLORS).unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/canvas.sqlite"

[sources]
episodes = "{root}/data/episode_data.txt"
subjects = "{root}/data/subject_data.csv"
colors = "{root}/data/color_data.csv"

[ingest]
season_size = 2

[server]
bind = "{bind}"
"#,
        root = root.display(),
        bind = bind,
    );

    let config_path = config_dir.join("canvas.toml");
    fs::write(&config_path, config_content).unwrap();

    TestEnv { tmp, config_path }
}

pub fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
