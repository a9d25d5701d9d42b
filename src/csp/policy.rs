use super::config::ContentSecurityPolicyConfig;
use super::directives::{DirectiveValue, Source, get_default_directives};
use crate::error::{HelmetError, Result};
use crate::handler::{Handler, Next, RequestHead, ResponseHeaders};
use axum::http::{
    HeaderName, HeaderValue,
    header::{CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY_REPORT_ONLY},
};
use std::collections::HashSet;

const UNIT: &str = "Content-Security-Policy";

/// Keywords that are only meaningful quoted
const SHOULD_BE_QUOTED: [&str; 9] = [
    "none",
    "self",
    "strict-dynamic",
    "report-sample",
    "inline-speculation-rules",
    "unsafe-inline",
    "unsafe-eval",
    "unsafe-hashes",
    "wasm-unsafe-eval",
];

/// Source expressions that browsers ignore unless quoted
const QUOTED_PREFIXES: [&str; 4] = ["nonce-", "sha256-", "sha384-", "sha512-"];

fn is_directive_value_invalid(value: &str) -> bool {
    value.contains([';', ',']) || HeaderValue::from_str(value).is_err()
}

fn must_be_quoted(value: &str) -> bool {
    SHOULD_BE_QUOTED.contains(&value) || QUOTED_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

fn is_directive_name_valid(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `scriptSrc` -> `script-src`
fn dashify(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

fn invalid_value(name: &str, value: &str) -> HelmetError {
    HelmetError::invalid_option(
        UNIT,
        format!(
            "Content-Security-Policy received an invalid directive value for {:?}: {:?}",
            name, value
        ),
    )
}

#[derive(Debug, Clone)]
struct NormalizedDirective {
    name: String,
    sources: Vec<Source>,
}

impl NormalizedDirective {
    fn is_static(&self) -> bool {
        self.sources.iter().all(|source| source.as_literal().is_some())
    }
}

fn normalize_directives(config: &ContentSecurityPolicyConfig) -> Result<Vec<NormalizedDirective>> {
    let defaults = get_default_directives();
    let use_defaults = config.use_defaults.unwrap_or(true);
    let raw_directives = config.directives.as_ref().unwrap_or(&defaults);

    let mut result: Vec<NormalizedDirective> = Vec::with_capacity(raw_directives.len());
    let mut seen = HashSet::new();
    let mut unset = HashSet::new();

    for (raw_name, value) in raw_directives.iter() {
        if !is_directive_name_valid(raw_name) {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!("Content-Security-Policy received an invalid directive name {:?}", raw_name),
            ));
        }

        let name = dashify(raw_name);
        if !seen.insert(name.clone()) {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!("Content-Security-Policy received a duplicate directive {:?}", name),
            ));
        }

        match value {
            DirectiveValue::Unset if name == "default-src" => {
                return Err(HelmetError::invalid_option(
                    UNIT,
                    "Content-Security-Policy needs a default-src but it was unset. If you really want to disable it, use `DirectiveValue::DangerouslyDisableDefaultSrc`.",
                ));
            }
            DirectiveValue::Unset => {
                unset.insert(name);
            }
            DirectiveValue::DangerouslyDisableDefaultSrc if name == "default-src" => {
                unset.insert(name);
            }
            DirectiveValue::DangerouslyDisableDefaultSrc => {
                return Err(HelmetError::invalid_option(
                    UNIT,
                    format!(
                        "Content-Security-Policy: tried to disable {:?} as if it were default-src; simply omit the key",
                        name
                    ),
                ));
            }
            DirectiveValue::Sources(sources) => {
                let invalid = sources.iter().filter_map(Source::as_literal).find(|literal| {
                    literal.is_empty() || is_directive_value_invalid(literal) || must_be_quoted(literal)
                });
                if let Some(literal) = invalid {
                    return Err(invalid_value(&name, literal));
                }
                result.push(NormalizedDirective {
                    name,
                    sources: sources.clone(),
                });
            }
        }
    }

    if use_defaults {
        for (name, value) in defaults.iter() {
            let present = result.iter().any(|directive| directive.name == name);
            if present || unset.contains(name) {
                continue;
            }
            if let DirectiveValue::Sources(sources) = value {
                result.push(NormalizedDirective {
                    name: name.to_string(),
                    sources: sources.clone(),
                });
            }
        }
    }

    if result.is_empty() {
        return Err(HelmetError::invalid_option(
            UNIT,
            "Content-Security-Policy has no directives. Either set some or disable the header",
        ));
    }

    let has_default_src = result.iter().any(|directive| directive.name == "default-src");
    if !has_default_src && !unset.contains("default-src") {
        return Err(HelmetError::invalid_option(
            UNIT,
            "Content-Security-Policy needs a default-src but none was provided. If you really want to disable it, use `DirectiveValue::DangerouslyDisableDefaultSrc`.",
        ));
    }

    Ok(result)
}

fn serialize(
    directives: &[NormalizedDirective],
    req: &RequestHead,
    res: &dyn ResponseHeaders,
) -> Result<String> {
    let mut parts = Vec::with_capacity(directives.len());

    for directive in directives {
        let mut part = directive.name.clone();
        for source in &directive.sources {
            match source {
                Source::Literal(literal) => {
                    part.push(' ');
                    part.push_str(literal);
                }
                Source::Dynamic(provider) => {
                    let value = provider.resolve(req, res);
                    if value.is_empty() {
                        continue;
                    }
                    if is_directive_value_invalid(&value) {
                        return Err(HelmetError::InvalidDynamicValue {
                            directive: directive.name.clone(),
                            value,
                        });
                    }
                    part.push(' ');
                    part.push_str(&value);
                }
            }
        }
        parts.push(part);
    }

    Ok(parts.join(";"))
}

/// Content-Security-Policy handler
///
/// Directives are validated and normalized once. Policies made only of
/// literal sources are serialized once as well; policies with dynamic
/// sources are serialized per request.
#[derive(Debug, Clone)]
pub struct ContentSecurityPolicy {
    header_name: HeaderName,
    directives: Vec<NormalizedDirective>,
    cached: Option<HeaderValue>,
}

impl ContentSecurityPolicy {
    pub fn new(config: &ContentSecurityPolicyConfig) -> Result<Self> {
        let header_name = if config.report_only {
            CONTENT_SECURITY_POLICY_REPORT_ONLY
        } else {
            CONTENT_SECURITY_POLICY
        };

        let directives = normalize_directives(config)?;

        let cached = if directives.iter().all(NormalizedDirective::is_static) {
            let empty = axum::http::HeaderMap::new();
            let value = serialize(&directives, &placeholder_head(), &empty)?;
            let value = HeaderValue::try_from(value.as_str()).map_err(|_| {
                HelmetError::invalid_option(
                    UNIT,
                    format!("Content-Security-Policy produced an invalid header value {:?}", value),
                )
            })?;
            Some(value)
        } else {
            None
        };

        Ok(Self {
            header_name,
            directives,
            cached,
        })
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    /// Normalized directive names, in emission order
    pub fn directive_names(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().map(|directive| directive.name.as_str())
    }

    /// Header value for one request
    pub fn header_value(&self, req: &RequestHead, res: &dyn ResponseHeaders) -> Result<HeaderValue> {
        if let Some(ref value) = self.cached {
            return Ok(value.clone());
        }

        // Every source was checked in `serialize`
        let value = serialize(&self.directives, req, res)?;
        HeaderValue::try_from(value).map_err(|err| HelmetError::Anyhow(err.into()))
    }
}

/// Literal-only policies never look at the request.
fn placeholder_head() -> RequestHead {
    let (head, ()) = axum::http::Request::new(()).into_parts();
    head
}

impl Handler for ContentSecurityPolicy {
    fn handle(&self, req: &RequestHead, res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()> {
        match self.header_value(req, res) {
            Ok(value) => {
                res.set_header(self.header_name.clone(), value);
                next.run(req, res)
            }
            Err(err) => next.abort(err),
        }
    }
}

/// Build the Content-Security-Policy unit
pub fn build_content_security_policy(config: &ContentSecurityPolicyConfig) -> Result<ContentSecurityPolicy> {
    ContentSecurityPolicy::new(config)
}
