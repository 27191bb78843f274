use chrono::NaiveDateTime;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderErrorReason,
};

/// # date formatting helper
/// renders a serialized `NaiveDateTime` in a human readable form
///
/// ### usage
/// ```handlebars
/// {{formatDate generated}}
/// ```
#[derive(Clone, Copy)]
pub struct FormatDateHelper;

impl HelperDef for FormatDateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        helper: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> HelperResult {
        let date_param = match helper.param(0) {
            Some(param) => param,
            None => return Ok(()),
        };

        let date: NaiveDateTime = serde_json::from_value(date_param.value().clone())
            .map_err(|_| RenderErrorReason::InvalidParamType("NaiveDateTime"))?;
        out.write(&format!("{}", date.format("%A %e %B %Y, %H:%M")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_helper("formatDate", Box::new(FormatDateHelper));
        hbs
    }

    #[test]
    fn test_format_date() {
        let out = registry()
            .render_template("{{formatDate d}}", &json!({"d": "2024-03-02T15:04:05"}))
            .unwrap();
        assert_eq!(out, "Saturday  2 March 2024, 15:04");
    }

    #[test]
    fn test_format_date_rejects_other_values() {
        let res = registry().render_template("{{formatDate d}}", &json!({"d": "last week"}));
        assert!(res.is_err());
    }
}
