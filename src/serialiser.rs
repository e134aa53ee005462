use crate::pack::SubsPack;
use crate::subtitle::Subtitle;

use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::warn;

/// Writes the pack as SubRip, numbering the subtitles from 1.
pub fn serialise<W: Write>(pack: &SubsPack, output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    write_subs(&mut writer, pack.subs()).context("Failed to write to output file.")?;
    writer.flush().context("Failed to write to output file.")?;
    Ok(())
}

fn write_subs<W: Write>(buf: &mut W, subs: &[Subtitle]) -> Result<()> {
    for (idx, sub) in subs.iter().enumerate() {
        write_sub(buf, idx + 1, sub)?;
    }
    Ok(())
}

fn write_sub<W: Write>(buf: &mut W, seq_num: usize, sub: &Subtitle) -> Result<()> {
    writeln!(buf, "{}", seq_num)?;
    write_ts(buf, sub.time_in)?;
    write!(buf, " --> ")?;
    write_ts(buf, sub.time_out)?;
    writeln!(buf)?;
    for (i, line) in sub.lines.iter().enumerate() {
        if i == 0 {
            if let Some(code) = sub.pos.an_code() {
                write!(buf, "{{\\an{}}}", code)?;
            }
        }
        if sub.color.is_empty() {
            writeln!(buf, "{}", line)?;
        } else {
            writeln!(buf, "<font color=\"{}\">{}</font>", sub.color, line)?;
        }
    }
    writeln!(buf)?;
    Ok(())
}

fn write_ts<W: Write>(buf: &mut W, timestamp: Duration) -> Result<()> {
    let mut millis = timestamp.num_milliseconds();
    if millis < 0 {
        warn!("Clamping negative timestamp {}ms to zero", millis);
        millis = 0;
    }
    let total_secs = millis / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = millis % 1000;
    write!(
        buf,
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::Pos;
    use std::io::Cursor;

    macro_rules! test_write_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let ts = Duration::milliseconds(input);
                let mut buf = Cursor::new(vec![]);

                write_ts(&mut buf, ts).expect("Failed to write to buffer");

                assert_eq!(String::from_utf8(buf.into_inner()).unwrap(), expected);
            }
        )*
        }
    }

    test_write_ts! {
        test_write_ts_0: (0, "00:00:00,000"),
        test_write_ts_1: (1, "00:00:00,001"),
        test_write_ts_2: (999, "00:00:00,999"),
        test_write_ts_3: (1000, "00:00:01,000"),
        test_write_ts_4: (1001, "00:00:01,001"),
        test_write_ts_5: (59_999, "00:00:59,999"),
        test_write_ts_6: (60_000, "00:01:00,000"),
        test_write_ts_7: (3_600_000, "01:00:00,000"),
        test_write_ts_8: (7_326_159, "02:02:06,159"),
        test_write_ts_9: (34_380_001, "09:33:00,001"),
        test_write_ts_10: (360_000_001, "100:00:00,001"),
        test_write_ts_11: (-1500, "00:00:00,000"),
    }

    fn render(pack: &SubsPack) -> String {
        let mut out = Vec::new();
        serialise(pack, &mut out).expect("Failed to serialise");
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renumbers_from_one() {
        let pack = SubsPack::new(vec![
            Subtitle::new(Duration::seconds(1), Duration::seconds(2), vec!["A".into()]),
            Subtitle::new(Duration::seconds(3), Duration::seconds(4), vec!["B".into(), "b".into()]),
        ]);
        assert_eq!(
            render(&pack),
            "1\n00:00:01,000 --> 00:00:02,000\nA\n\n2\n00:00:03,000 --> 00:00:04,000\nB\nb\n\n"
        );
    }

    #[test]
    fn writes_pos_and_color() {
        let mut sub = Subtitle::new(Duration::zero(), Duration::seconds(1), vec!["Hi".into(), "there".into()]);
        sub.pos = Pos::Top;
        sub.color = "#ffff00".into();
        let out = render(&SubsPack::new(vec![sub]));
        assert_eq!(
            out,
            "1\n00:00:00,000 --> 00:00:01,000\n{\\an8}<font color=\"#ffff00\">Hi</font>\n<font color=\"#ffff00\">there</font>\n\n"
        );
    }
}
