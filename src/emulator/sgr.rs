//! Select Graphic Rendition (`CSI ... m`)

use tracing::debug;

use super::terminal::CharacterTerminal;
use crate::core::{Color, DrawStyle};

/// Apply SGR parameters to the surface's draw state.
///
/// Each parameter updates only the bits or colour it names. An empty list
/// behaves like `0`.
pub fn apply<T: CharacterTerminal + ?Sized>(term: &mut T, params: &[i32]) {
    let mut style = term.draw_style();
    let mut fg = term.draw_foreground();
    let mut bg = term.draw_background();

    if params.is_empty() {
        style = DrawStyle::empty();
        fg = Color::Default;
        bg = Color::Default;
    }

    let mut i = 0;
    while i < params.len() {
        let param = params[i];
        match param {
            0 => {
                style = DrawStyle::empty();
                fg = Color::Default;
                bg = Color::Default;
            }
            1 => style |= DrawStyle::BOLD,
            2 => style |= DrawStyle::FAINT,
            3 => style |= DrawStyle::ITALIC,
            4 => style |= DrawStyle::UNDERSCORE,
            5 => style |= DrawStyle::BLINK,
            7 => style |= DrawStyle::INVERSE,
            8 => style |= DrawStyle::HIDDEN,
            9 => style |= DrawStyle::STRIKETHROUGH,
            22 => style.remove(DrawStyle::BOLD | DrawStyle::FAINT),
            23 => style.remove(DrawStyle::ITALIC),
            24 => style.remove(DrawStyle::UNDERSCORE),
            25 => style.remove(DrawStyle::BLINK),
            27 => style.remove(DrawStyle::INVERSE),
            28 => style.remove(DrawStyle::HIDDEN),
            29 => style.remove(DrawStyle::STRIKETHROUGH),
            30..=37 => fg = Color::Indexed((param - 30) as u8),
            38 => {
                if let Some((color, used)) = extended_color(&params[i + 1..]) {
                    fg = color;
                    i += used;
                }
            }
            39 => fg = Color::Default,
            40..=47 => bg = Color::Indexed((param - 40) as u8),
            48 => {
                if let Some((color, used)) = extended_color(&params[i + 1..]) {
                    bg = color;
                    i += used;
                }
            }
            49 => bg = Color::Default,
            90..=97 => fg = Color::Indexed((param - 90 + 8) as u8),
            100..=107 => bg = Color::Indexed((param - 100 + 8) as u8),
            _ => debug!("Unknown SGR parameter: {}", param),
        }
        i += 1;
    }

    term.set_draw_style(style);
    term.set_draw_foreground(fg);
    term.set_draw_background(bg);
}

/// `5;N` or `2;R;G;B` after 38/48. Returns the colour and the number of
/// parameters consumed.
fn extended_color(rest: &[i32]) -> Option<(Color, usize)> {
    let channel = |v: i32| v.clamp(0, 255) as u8;
    match rest {
        [5, index, ..] => Some((Color::Indexed(channel(*index)), 2)),
        [2, r, g, b, ..] => Some((Color::Rgb(channel(*r), channel(*g), channel(*b)), 4)),
        [mode, ..] => {
            debug!("Unsupported extended colour mode: {}", mode);
            None
        }
        [] => None,
    }
}
