use crate::error::SubsError;
use crate::subtitle::Subtitle;

use anyhow::Context;
use chrono::Duration;
use nom::bytes::complete::{tag, take_while1, take_while_m_n};
use nom::character::complete::{digit1, line_ending, multispace0, multispace1, space0, space1};
use nom::combinator::{map_res, opt};
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::multi::many_till;
use nom::sequence::terminated;
use nom::{branch::alt, error_position, Err, IResult};
use tracing::debug;

/// Decoder for SubRip (`.srt`) files.
///
/// Subtitles are returned in file order; call [`crate::SubsPack::sort`] if
/// the file is not ordered by appearance time.
pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    pub fn parse(&mut self, input: &str) -> Result<Vec<Subtitle>, anyhow::Error> {
        match srt_file(input) {
            Ok((_, subs)) => {
                debug!("Parsed {} subtitles", subs.len());
                Ok(subs)
            }
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                let conv = convert_error(input, err);
                Err(SubsError::ParseError(conv)).context("Failed to parse SRT file")
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        }
    }
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>, VerboseError<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn srt_file(input: &str) -> IResult<&str, Vec<Subtitle>, VerboseError<&str>> {
    let (input, _) = optional_bom(input)?;
    let (input, subs) = all_subtitles(input)?;
    let (input, _) = end_of_file(input)?;
    Ok((input, subs))
}

fn all_subtitles(input: &str) -> IResult<&str, Vec<Subtitle>, VerboseError<&str>> {
    let mut parsed_subs = Vec::new();
    let mut input = input;
    loop {
        match subtitle(input) {
            Ok((rem_input, subtitle)) => {
                parsed_subs.push(subtitle);
                input = rem_input;
                let (rem_input, _) = multispace0(input)?;
                input = rem_input;
            }
            Err(err) => {
                if input.is_empty() {
                    return Ok((input, parsed_subs));
                } else {
                    return Err(err);
                }
            }
        }
    }
}

fn subtitle(input: &str) -> IResult<&str, Subtitle, VerboseError<&str>> {
    let (input, _) = multispace0(input)?;
    let (input, _) = terminated(seq_num, multispace1)(input)?;
    let (input, (time_in, time_out)) = terminated(show_hide, line_ending)(input)?;
    let (input, lines) = sub_text(input)?;

    Ok((input, Subtitle::new(time_in, time_out, lines)))
}

fn end_of_file(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        std::result::Result::Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

fn sub_text(input: &str) -> IResult<&str, Vec<String>, VerboseError<&str>> {
    let line = terminated(
        take_while1(|c: char| c != '\n' && c != '\r'),
        alt((line_ending, end_of_file)),
    );

    let (input, (vec, _)) = many_till(line, alt((line_ending, end_of_file)))(input)?;

    Ok((input, vec.into_iter().map(String::from).collect()))
}

fn show_hide(input: &str) -> IResult<&str, (Duration, Duration), VerboseError<&str>> {
    let (input, time_in) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, time_out) = timestamp(input)?;
    let (input, _) = space0(input)?;

    Ok((input, (time_in, time_out)))
}

fn timestamp(input: &str) -> IResult<&str, Duration, VerboseError<&str>> {
    const MILLIS_MIN: usize = 0;
    const MILLIS_MAX: usize = 3;
    let take_millis = || {
        map_res(
            take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
            move |s: &str| {
                if s.len() < MILLIS_MAX {
                    // Sometimes, a milliseconds value like `,2` may be encountered.
                    // This is not valid SRT, but we must be able to handle it anyway.
                    // We choose to interpret this as `,200`. In other words, we right-pad
                    // every string until it reaches a length of 3 characters.
                    let millis = format!("{:0<3}", s);
                    millis.parse()
                } else {
                    s.parse()
                }
            },
        )
    };

    const HMS_MIN: usize = 0;
    const HMS_MAX: usize = 2;
    let take_hms = || {
        map_res(
            take_while_m_n(HMS_MIN, HMS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| {
                if s.len() < HMS_MAX {
                    // Unlike in the previous situation, here we left-pad the value instead,
                    // because it makes more sense to treat 1:13:45 as 01:13:45 than as 10:13:45.
                    let millis = format!("{:0>2}", s);
                    millis.parse()
                } else {
                    s.parse()
                }
            },
        )
    };

    // Hours are unbounded, long recordings can pass 99 hours.
    let (input, hours): (_, i64) = map_res(digit1, |s: &str| s.parse())(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes): (_, i64) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = take_hms()(input)?;
    // Some writers use the WebVTT style `.` as the millisecond separator.
    let (input, _) = alt((tag(","), tag(".")))(input)?;
    let (input, millis): (_, i64) = take_millis()(input)?;

    Ok((
        input,
        Duration::milliseconds(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}

fn seq_num(input: &str) -> IResult<&str, usize, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_read_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let (_, duration) = timestamp(input).unwrap();

                assert_eq!(duration.num_milliseconds(), expected);
            }
        )*
        }
    }

    test_read_ts! {
        test_read_ts_0: ("00:00:01,200", 1200),
        test_read_ts_1: ("00:00:01,2", 1200),
        test_read_ts_2: ("00:00:01,002", 1002),
        test_read_ts_3: ("00:00:01,02", 1020),
        test_read_ts_4: ("00:00:01,", 1000),
        test_read_ts_5: ("1:1:1,200", 3661200),
        test_read_ts_6: ("01:01:01,200", 3661200),
        test_read_ts_7: ("00:00:01.500", 1500),
        test_read_ts_8: ("100:00:00,001", 360_000_001),
    }

    #[test]
    fn parses_file_in_file_order() {
        let input = "\u{FEFF}1\r\n00:00:05,000 --> 00:00:06,000\r\nSecond\r\n\r\n\
                     2\r\n00:00:01,000 --> 00:00:02,500\r\n<i>First</i>\r\nline two\r\n";
        let subs = Parser::new().parse(input).unwrap();

        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].lines, vec!["Second"]);
        assert_eq!(subs[1].time_in, Duration::seconds(1));
        assert_eq!(subs[1].time_out, Duration::milliseconds(2500));
        assert_eq!(subs[1].lines, vec!["<i>First</i>", "line two"]);
    }

    #[test]
    fn reads_back_long_timestamps() {
        let pack = crate::SubsPack::new(vec![Subtitle::new(
            Duration::hours(123),
            Duration::hours(123) + Duration::milliseconds(1500),
            vec!["Still here".to_string()],
        )]);
        let mut out = Vec::new();
        crate::serialiser::serialise(&pack, &mut out).unwrap();

        let subs = Parser::new().parse(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(subs, pack.into_subs());
    }

    #[test]
    fn parses_empty_input() {
        let subs = Parser::new().parse("").unwrap();
        assert!(subs.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        let err = Parser::new()
            .parse("1\nnot a timestamp\nHello\n")
            .unwrap_err();
        assert!(err.downcast_ref::<SubsError>().is_some());
    }
}
