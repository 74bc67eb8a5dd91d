//! 形態素解析を実行するユーティリティ
//!
//! このバイナリは、引数に渡されたテキストを形態素解析し、1行1トークンの
//! タブ区切り形式またはJSON配列で結果を出力します。
//!
//! 終了コード: 成功時は0、使用方法の誤りは2、内部エラーは1。

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use himotoki::{Dictionary, Token, Tokenizer};

use clap::Parser;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "tokenize", about = "Segments Japanese text into morphemes")]
struct Args {
    /// Binary dictionary. Defaults to $HIMOTOKI_DICT or data/himotoki.dic.
    #[clap(short = 'i', long)]
    dict: Option<PathBuf>,

    /// Prints the tokens as a JSON array.
    #[clap(long)]
    json: bool,

    /// Text to segment.
    text: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> himotoki::Result<()> {
    let dict_path = args
        .dict
        .clone()
        .unwrap_or_else(himotoki::default_dictionary_path);
    let dict = Dictionary::from_path(dict_path)?;
    let tokenizer = Tokenizer::new(dict);

    let tokens = tokenizer.tokenize(&args.text);

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    if args.json {
        let array: Vec<serde_json::Value> = tokens.iter().map(token_to_json).collect();
        writeln!(out, "{}", serde_json::Value::Array(array))?;
    } else {
        for t in &tokens {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}..{}",
                t.surface(),
                t.reading(),
                t.pos(),
                t.base_form(),
                t.base_form_id(),
                t.start(),
                t.end(),
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

fn token_to_json(t: &Token) -> serde_json::Value {
    serde_json::json!({
        "surface": t.surface(),
        "reading": t.reading(),
        "pos": t.pos(),
        "base_form": t.base_form(),
        "base_form_id": t.base_form_id(),
        "start": t.start(),
        "end": t.end(),
    })
}
