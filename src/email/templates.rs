pub const DEFAULT_SUBJECT: &str = "Your Wizarr Invitation";

/// Everything the invitation email needs to say.
#[derive(Debug, Clone)]
pub struct InvitationDetails {
    pub subject: Option<String>,
    pub server_name: String,
    pub server_type: String,
    pub invitation_url: String,
    pub expires_in_days: Option<u32>,
    pub allow_downloads: bool,
    pub allow_live_tv: bool,
    pub allow_mobile_uploads: bool,
    /// True when the invitation grants access to selected libraries only.
    pub limited_libraries: bool,
}

impl InvitationDetails {
    fn expires_description(&self) -> String {
        match self.expires_in_days {
            Some(days) => format!("{days} days"),
            None => "Never".to_string(),
        }
    }

    fn access_description(&self) -> String {
        let mut granted = Vec::new();
        if self.allow_downloads {
            granted.push("Downloads");
        }
        if self.allow_live_tv {
            granted.push("Live TV");
        }
        if self.allow_mobile_uploads {
            granted.push("Mobile uploads");
        }
        if granted.is_empty() {
            "Streaming only".to_string()
        } else {
            granted.join(", ")
        }
    }

    fn library_description(&self) -> &'static str {
        if self.limited_libraries {
            "Limited"
        } else {
            "Full Library Access"
        }
    }
}

/// Rendered invitation email bodies.
pub struct InvitationEmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl InvitationEmailContent {
    /// Render subject, plain-text and HTML bodies.
    #[must_use]
    pub fn new(details: &InvitationDetails) -> Self {
        Self {
            subject: details
                .subject
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            text: Self::text_template(details),
            html: Self::html_template(details),
        }
    }

    fn text_template(details: &InvitationDetails) -> String {
        format!(
            r#"You have been invited to join the {server_name} {server_type} server!

Click the link below to accept your invitation:
{url}

Invitation Details:
- Server: {server_name} ({server_type})
- Expires: {expires}
- Access Level: {libraries}
- Permissions: {access}

Enjoy!"#,
            server_name = details.server_name,
            server_type = details.server_type,
            url = details.invitation_url,
            expires = details.expires_description(),
            libraries = details.library_description(),
            access = details.access_description(),
        )
    }

    fn html_template(details: &InvitationDetails) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background: #f5f5f5; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 40px 20px; }}
        .card {{ background: white; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        h1 {{ color: #1a1a1a; margin-top: 0; font-size: 24px; }}
        .cta {{ display: block; width: fit-content; margin: 24px auto; padding: 14px 32px; background: #667eea; color: white; border-radius: 24px; text-decoration: none; font-weight: bold; font-size: 16px; }}
        .details {{ background: #f8f9fa; border-left: 4px solid #667eea; border-radius: 8px; padding: 16px 20px; margin: 24px 0; }}
        .details h3 {{ color: #667eea; margin: 0 0 12px 0; font-size: 18px; }}
        .details p {{ margin: 4px 0; font-size: 14px; }}
        .link {{ font-size: 12px; color: #0066cc; word-break: break-all; background: #f0f0f0; padding: 10px; border-radius: 3px; }}
        .footer {{ margin-top: 32px; padding-top: 20px; border-top: 1px solid #eee; color: #888; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="card">
            <h1>Media Server Invitation</h1>
            <p>You have been invited to join the {server_name} {server_type} server!</p>
            <a class="cta" href="{url}">Accept Your Invitation</a>
            <div class="details">
                <h3>Invitation Details</h3>
                <p><strong>Server:</strong> {server_name} ({server_type})</p>
                <p><strong>Expires:</strong> {expires}</p>
                <p><strong>Access Level:</strong> {libraries}</p>
                <p><strong>Permissions:</strong> {access}</p>
            </div>
            <p>If the button doesn't work, copy this link to your browser:</p>
            <p class="link">{url}</p>
            <div class="footer">
                <p>If you have any issues, please contact your server administrator.</p>
            </div>
        </div>
    </div>
</body>
</html>"#,
            server_name = details.server_name,
            server_type = details.server_type,
            url = details.invitation_url,
            expires = details.expires_description(),
            libraries = details.library_description(),
            access = details.access_description(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> InvitationDetails {
        InvitationDetails {
            subject: None,
            server_name: "Main Plex".to_string(),
            server_type: "Plex".to_string(),
            invitation_url: "https://invites.example.com/j/ABC123".to_string(),
            expires_in_days: Some(7),
            allow_downloads: true,
            allow_live_tv: false,
            allow_mobile_uploads: false,
            limited_libraries: false,
        }
    }

    #[test]
    fn bodies_contain_url_and_server_name() {
        let content = InvitationEmailContent::new(&details());
        assert!(content.text.contains("https://invites.example.com/j/ABC123"));
        assert!(content.html.contains("https://invites.example.com/j/ABC123"));
        assert!(content.text.contains("Main Plex"));
        assert!(content.html.contains("Main Plex"));
    }

    #[test]
    fn subject_defaults_and_overrides() {
        let content = InvitationEmailContent::new(&details());
        assert_eq!(content.subject, DEFAULT_SUBJECT);

        let mut custom = details();
        custom.subject = Some("Welcome aboard".to_string());
        let content = InvitationEmailContent::new(&custom);
        assert_eq!(content.subject, "Welcome aboard");
    }

    #[test]
    fn expiry_renders_never_without_days() {
        let mut no_expiry = details();
        no_expiry.expires_in_days = None;
        let content = InvitationEmailContent::new(&no_expiry);
        assert!(content.text.contains("Expires: Never"));

        let content = InvitationEmailContent::new(&details());
        assert!(content.text.contains("Expires: 7 days"));
    }

    #[test]
    fn permissions_list_enabled_flags() {
        let content = InvitationEmailContent::new(&details());
        assert!(content.text.contains("Permissions: Downloads"));

        let mut none = details();
        none.allow_downloads = false;
        let content = InvitationEmailContent::new(&none);
        assert!(content.text.contains("Permissions: Streaming only"));
    }

    #[test]
    fn library_access_level_reflects_limitation() {
        let content = InvitationEmailContent::new(&details());
        assert!(content.html.contains("Full Library Access"));

        let mut limited = details();
        limited.limited_libraries = true;
        let content = InvitationEmailContent::new(&limited);
        assert!(content.html.contains("Limited"));
    }
}
