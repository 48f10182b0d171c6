use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::info;

use crate::error::PipelineError;

/// Where the raw CSV comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

pub fn load(source: &Source) -> Result<DataFrame> {
    let df = match source {
        Source::Url(url) => fetch_csv(url)?,
        Source::File(path) => read_csv(path)?,
    };
    info!(rows = df.height(), cols = df.width(), "loaded dataset");

    Ok(df)
}

pub fn fetch_csv(url: &str) -> Result<DataFrame> {
    info!(%url, "fetching csv");
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("could not build http client")?;

    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("could not fetch {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PipelineError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let body = resp.bytes().context("could not read response body")?;

    read_csv_bytes(body.to_vec())
}

pub fn read_csv(file_path: impl AsRef<Path>) -> Result<DataFrame> {
    let file_path = file_path.as_ref();
    let bytes = std::fs::read(file_path)
        .with_context(|| format!("could not read {}", file_path.display()))?;

    read_csv_bytes(bytes)
}

/// Parses CSV with a header row. Schema inference scans the whole input so a
/// year column with stray text comes back as strings rather than a parse error.
pub fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    let df = CsvReader::new(Cursor::new(bytes))
        .has_header(true)
        .infer_schema(None)
        .finish()
        .context("could not parse csv")?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "Company,Year Founded,IPO Year\n\
        Acme,2000,2005\n\
        Globex,2000,2006\n\
        Initech,2001,2003\n";

    #[test]
    fn test_read_csv_bytes() {
        let df = read_csv_bytes(SAMPLE.as_bytes().to_vec()).unwrap();
        assert_eq!(df.shape(), (3, 3));
        assert_eq!(
            df.get_column_names(),
            &["Company", "Year Founded", "IPO Year"]
        );
    }

    #[test]
    fn test_read_csv_bytes_mixed_column_is_text() {
        let data = "Company,Year Founded,IPO Year\nAcme,2000,2005\nGlobex,2000,n/a\n";
        let df = read_csv_bytes(data.as_bytes().to_vec()).unwrap();
        assert_eq!(df.column("IPO Year").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let df = load(&Source::File(file.path().to_path_buf())).unwrap();
        assert_eq!(df.height(), 3);
    }

    /// Serves a single canned HTTP response on localhost and returns its url.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        use std::io::{BufRead, BufReader};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }

            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).unwrap();
        });

        format!("http://{addr}/ipo.csv")
    }

    #[test]
    fn test_fetch_csv_ok() {
        let url = serve_once("200 OK", SAMPLE);

        let df = fetch_csv(&url).unwrap();
        assert_eq!(df.shape(), (3, 3));
    }

    #[test]
    fn test_fetch_csv_bad_status() {
        let url = serve_once("404 Not Found", "missing");

        let err = load(&Source::Url(url.clone())).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::BadStatus { url: failed, status }) => {
                assert_eq!(*status, 404);
                assert_eq!(failed, &url);
            }
            other => panic!("expected BadStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let res = load(&Source::File(PathBuf::from("does/not/exist.csv")));
        assert!(res.is_err());
    }
}
