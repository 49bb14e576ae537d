//! Color functions (spec §4.7 "Color"): channel constructors, HSL
//! adjustments, and blending.

use crate::color::Color;
use crate::error::LessError;

use super::{color_node, expect_color, expect_fraction, expect_dimension, number_node, Args, Context, FunctionRegistry};

pub fn register(r: &mut FunctionRegistry) {
    r.register("rgb", rgb);
    r.register("rgba", rgba);
    r.register("hsl", hsl);
    r.register("hsla", hsla);
    r.register("hsv", hsv);
    r.register("hsva", hsv);
    r.register("lighten", lighten);
    r.register("darken", darken);
    r.register("saturate", saturate);
    r.register("desaturate", desaturate);
    r.register("fadein", fadein);
    r.register("fadeout", fadeout);
    r.register("fade", fade);
    r.register("spin", spin);
    r.register("mix", mix);
    r.register("greyscale", greyscale);
    r.register("grayscale", greyscale);
    r.register("contrast", contrast);
    r.register("red", channel_red);
    r.register("green", channel_green);
    r.register("blue", channel_blue);
    r.register("alpha", channel_alpha);
    r.register("luma", luma);
    r.register("hue", hue);
    r.register("saturation", saturation);
    r.register("lightness", lightness);
}

fn channel_value(args: &Args, idx: usize, func: &str) -> Result<f64, LessError> {
    let d = expect_dimension(args, idx, func)?;
    Ok(d.value)
}

fn rgb(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let r = channel_value(args, 0, "rgb")?;
    let g = channel_value(args, 1, "rgb")?;
    let b = channel_value(args, 2, "rgb")?;
    Ok(color_node(span, &args[0], Color::rgb(r, g, b)))
}

fn rgba(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let r = channel_value(args, 0, "rgba")?;
    let g = channel_value(args, 1, "rgba")?;
    let b = channel_value(args, 2, "rgba")?;
    let a = expect_fraction(args, 3, "rgba")?;
    let _ = ctx;
    Ok(color_node(span, &args[0], Color::rgba(r, g, b, a)))
}

fn hsl(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let h = channel_value(args, 0, "hsl")?;
    let s = expect_fraction(args, 1, "hsl")?;
    let l = expect_fraction(args, 2, "hsl")?;
    let _ = ctx;
    Ok(color_node(span, &args[0], Color::from_hsl(h, s, l, 1.0)))
}

fn hsla(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let h = channel_value(args, 0, "hsla")?;
    let s = expect_fraction(args, 1, "hsla")?;
    let l = expect_fraction(args, 2, "hsla")?;
    let a = expect_fraction(args, 3, "hsla")?;
    let _ = ctx;
    Ok(color_node(span, &args[0], Color::from_hsl(h, s, l, a)))
}

fn hsv(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let h = channel_value(args, 0, "hsv")?;
    let s = expect_fraction(args, 1, "hsv")?;
    let v = expect_fraction(args, 2, "hsv")?;
    let a = if args.len() > 3 { expect_fraction(args, 3, "hsv")? } else { 1.0 };
    let _ = ctx;
    let l = v * (1.0 - s / 2.0);
    let s_hsl = if l <= 0.0 || l >= 1.0 { 0.0 } else { (v - l) / l.min(1.0 - l) };
    Ok(color_node(span, &args[0], Color::from_hsl(h, s_hsl, l, a)))
}

fn saturate(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    adjust_hsl(ctx, args, span, "saturate", 1.0)
}

fn desaturate(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    adjust_hsl(ctx, args, span, "desaturate", -1.0)
}

fn lighten(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    adjust_hsl(ctx, args, span, "lighten", 1.0)
}

fn darken(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    adjust_hsl(ctx, args, span, "darken", -1.0)
}

/// Shared HSL-channel nudge used by saturate/desaturate/lighten/darken:
/// saturate/desaturate move `s`, lighten/darken move `l`, both by
/// `amount * sign` clamped into `[0, 1]`.
fn adjust_hsl(
    ctx: &mut Context,
    args: &Args,
    span: codemap::Span,
    func: &str,
    sign: f64,
) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, func)?;
    let amount = expect_fraction(args, 1, func)?;
    let (h, s, l) = color.to_hsl();
    let (s, l) = match func {
        "saturate" | "desaturate" => ((s + sign * amount).clamp(0.0, 1.0), l),
        "lighten" | "darken" => (s, (l + sign * amount).clamp(0.0, 1.0)),
        _ => unreachable!(),
    };
    Ok(color_node(span, &args[0], Color::from_hsl(h, s, l, color.alpha())))
}

fn fadein(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    fade_adjust(ctx, args, span, "fadein", 1.0)
}

fn fadeout(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    fade_adjust(ctx, args, span, "fadeout", -1.0)
}

fn fade_adjust(
    ctx: &mut Context,
    args: &Args,
    span: codemap::Span,
    func: &str,
    sign: f64,
) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, func)?;
    let amount = expect_fraction(args, 1, func)?;
    let alpha = (color.alpha() + sign * amount).clamp(0.0, 1.0);
    Ok(color_node(
        span,
        &args[0],
        Color::rgba(color.r(), color.g(), color.b(), alpha),
    ))
}

fn fade(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "fade")?;
    let amount = expect_fraction(args, 1, "fade")?;
    Ok(color_node(
        span,
        &args[0],
        Color::rgba(color.r(), color.g(), color.b(), amount.clamp(0.0, 1.0)),
    ))
}

fn spin(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "spin")?;
    let amount = channel_value(args, 1, "spin")?;
    let (h, s, l) = color.to_hsl();
    Ok(color_node(span, &args[0], Color::from_hsl(h + amount, s, l, color.alpha())))
}

fn mix(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let c1 = expect_color(args, 0, "mix")?;
    let c2 = expect_color(args, 1, "mix")?;
    let weight = if args.len() > 2 { expect_fraction(args, 2, "mix")? } else { 0.5 };
    let p = weight;
    let w = p * 2.0 - 1.0;
    let alpha_delta = c1.alpha() - c2.alpha();
    let mut w1 = if (w * alpha_delta).abs() == 1.0 {
        w
    } else {
        (w + alpha_delta) / (1.0 + w * alpha_delta)
    };
    w1 = (w1 + 1.0) / 2.0;
    let w2 = 1.0 - w1;
    let r = c1.r() * w1 + c2.r() * w2;
    let g = c1.g() * w1 + c2.g() * w2;
    let b = c1.b() * w1 + c2.b() * w2;
    let a = c1.alpha() * p + c2.alpha() * (1.0 - p);
    Ok(color_node(span, &args[0], Color::rgba(r, g, b, a)))
}

fn greyscale(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "greyscale")?;
    let (h, _s, l) = color.to_hsl();
    Ok(color_node(span, &args[0], Color::from_hsl(h, 0.0, l, color.alpha())))
}

fn contrast(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "contrast")?;
    let dark = if args.len() > 1 {
        expect_color(args, 1, "contrast")?
    } else {
        Color::rgb(0.0, 0.0, 0.0)
    };
    let light = if args.len() > 2 {
        expect_color(args, 2, "contrast")?
    } else {
        Color::rgb(255.0, 255.0, 255.0)
    };
    let threshold = if args.len() > 3 { expect_fraction(args, 3, "contrast")? } else { 0.43 };
    let luma = relative_luma(&color) / 255.0;
    let chosen = if luma < threshold { light } else { dark };
    Ok(color_node(span, &args[0], chosen))
}

fn relative_luma(c: &Color) -> f64 {
    0.2126 * c.r() + 0.7152 * c.g() + 0.0722 * c.b()
}

fn luma(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "luma")?;
    Ok(number_node(span, &args[0], relative_luma(&color) / 255.0 * 100.0))
}

fn channel_red(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "red")?;
    Ok(number_node(span, &args[0], color.r()))
}

fn channel_green(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "green")?;
    Ok(number_node(span, &args[0], color.g()))
}

fn channel_blue(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "blue")?;
    Ok(number_node(span, &args[0], color.b()))
}

fn channel_alpha(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "alpha")?;
    Ok(number_node(span, &args[0], color.alpha()))
}

fn hue(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "hue")?;
    Ok(number_node(span, &args[0], color.to_hsl().0))
}

fn saturation(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "saturation")?;
    Ok(number_node(span, &args[0], color.to_hsl().1 * 100.0))
}

fn lightness(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    let color = expect_color(args, 0, "lightness")?;
    Ok(number_node(span, &args[0], color.to_hsl().2 * 100.0))
}
