//! HTML view layer. Handlers hand over typed data; markup and escaping
//! live here and nowhere else.

use gfax_types::models::Fax;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} — GFAX</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; max-width: 640px; margin: 40px auto; padding: 0 16px; }}\n\
         h1 {{ letter-spacing: 1px; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         td, th {{ border-bottom: 1px solid #ccc; padding: 8px; text-align: left; }}\n\
         .notice {{ background: #f4f4f4; padding: 12px; border-left: 4px solid #2a7; }}\n\
         nav a {{ margin-right: 12px; }}\n\
         form label {{ display: block; margin-top: 12px; }}\n\
         textarea {{ width: 100%; min-height: 140px; font-family: monospace; }}\n\
         </style>\n</head>\n<body>\n<h1>GFAX</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

pub fn login_page() -> String {
    layout(
        "Sign in",
        "<h2>Sign in</h2>\n\
         <p>Enter your email and we will send you a sign-in link.</p>\n\
         <form method=\"post\" action=\"/\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <button type=\"submit\">Send link</button>\n\
         </form>\n\
         <p>No account yet? <a href=\"/register\">Register</a></p>",
    )
}

pub fn login_link_sent(email: &str, fallback_link: Option<&str>) -> String {
    let mut body = format!(
        "<h2>Check your inbox</h2>\n\
         <p class=\"notice\">If an account exists for {}, a sign-in link is on its way. \
         It expires after a short while.</p>",
        escape(email)
    );
    if let Some(link) = fallback_link {
        body.push_str(&format!(
            "\n<p class=\"notice\">Mail delivery is unavailable right now — \
             use this link directly: <a href=\"{0}\">{0}</a></p>",
            escape(link)
        ));
    }
    layout("Link sent", &body)
}

pub fn register_page() -> String {
    layout(
        "Register",
        "<h2>Register</h2>\n\
         <p>Registering assigns you a fax number others can send to.</p>\n\
         <form method=\"post\" action=\"/register\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <button type=\"submit\">Register</button>\n\
         </form>",
    )
}

pub fn registered(email: &str, fax_number: &str) -> String {
    layout(
        "Registered",
        &format!(
            "<h2>Welcome aboard</h2>\n\
             <p class=\"notice\">Your fax number is <strong>{}</strong>.</p>\n\
             <p>Account email: {}</p>\n\
             <p><a href=\"/\">Sign in</a> to open your inbox.</p>",
            escape(fax_number),
            escape(email)
        ),
    )
}

pub fn dashboard(own_fax: &str, faxes: &[Fax]) -> String {
    let mut body = format!(
        "<nav><a href=\"/dashboard\">Inbox</a><a href=\"/compose\">Compose</a>\
         <a href=\"/logout\">Sign out</a></nav>\n\
         <h2>Inbox for {}</h2>\n",
        escape(own_fax)
    );

    if faxes.is_empty() {
        body.push_str("<p>No faxes yet.</p>");
    } else {
        body.push_str("<table>\n<tr><th>From</th><th>Received</th><th></th></tr>\n");
        for fax in faxes {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td>\
                 <td><a href=\"/view/{}\">View</a></td></tr>\n",
                escape(&fax.sender),
                fax.received_at.format("%Y-%m-%d %H:%M"),
                fax.id,
            ));
        }
        body.push_str("</table>");
    }

    layout("Inbox", &body)
}

pub fn compose_page(own_fax: &str) -> String {
    layout(
        "Compose",
        &format!(
            "<nav><a href=\"/dashboard\">Inbox</a><a href=\"/logout\">Sign out</a></nav>\n\
             <h2>Compose</h2>\n\
             <p>Sending as <strong>{}</strong></p>\n\
             <form method=\"post\" action=\"/compose\">\n\
             <label>Recipient fax number \
             <input type=\"text\" name=\"recipient\" placeholder=\"GFAX-1001\" required></label>\n\
             <label>Message <textarea name=\"content\" required></textarea></label>\n\
             <button type=\"submit\">Send fax</button>\n\
             </form>",
            escape(own_fax)
        ),
    )
}

pub fn fax_sent(recipient: &str) -> String {
    layout(
        "Sent",
        &format!(
            "<h2>Fax sent</h2>\n\
             <p class=\"notice\">Your fax to <strong>{}</strong> has been delivered.</p>\n\
             <p><a href=\"/dashboard\">Back to inbox</a></p>",
            escape(recipient)
        ),
    )
}

pub fn error_page(title: &str, detail: &str) -> String {
    layout(
        title,
        &format!(
            "<h2>{}</h2>\n<p class=\"notice\">{}</p>\n<p><a href=\"/\">Back to sign in</a></p>",
            escape(title),
            escape(detail)
        ),
    )
}
