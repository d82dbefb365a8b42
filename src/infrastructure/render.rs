use std::time::SystemTime;

use crate::domain::{Port, SiteDomain};

/// Path answering health probes without touching the backend.
pub const HEALTH_PATH: &str = "/proxy-health";

/// Marker of the line carrying the render time; the only varying line.
pub const GENERATED_PREFIX: &str = "# Generated: ";

/// Builds the server block for a reverse-proxy site.
#[derive(Debug, Clone, Default)]
pub struct ConfigRenderer;

impl ConfigRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, domain: &SiteDomain, backend_host: &str, port: Port) -> String {
        self.render_at(domain, backend_host, port, SystemTime::now())
    }

    pub fn render_at(
        &self,
        domain: &SiteDomain,
        backend_host: &str,
        port: Port,
        at: SystemTime,
    ) -> String {
        let generated = humantime::format_rfc3339_seconds(at);
        format!(
            r#"# sitectl generated configuration
# Domain: {domain} | Backend: {backend_host}:{port}
{GENERATED_PREFIX}{generated}

server {{
    listen 80;
    server_name {domain};

    # Security headers
    add_header X-Frame-Options "SAMEORIGIN" always;
    add_header X-Content-Type-Options "nosniff" always;
    add_header X-XSS-Protection "1; mode=block" always;

    location / {{
        proxy_pass http://{backend_host}:{port};
        proxy_http_version 1.1;

        # WebSocket support
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection 'upgrade';
        proxy_cache_bypass $http_upgrade;

        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;

        proxy_connect_timeout 60s;
        proxy_send_timeout 60s;
        proxy_read_timeout 60s;
    }}

    location {HEALTH_PATH} {{
        access_log off;
        add_header Content-Type text/plain;
        return 200 "healthy\n";
    }}
}}
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn domain() -> SiteDomain {
        SiteDomain::new("svc.test www.svc.test").unwrap()
    }

    fn without_timestamp(body: &str) -> String {
        body.lines()
            .filter(|l| !l.starts_with(GENERATED_PREFIX))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_proxy_rule() {
        let body = ConfigRenderer::new().render(&domain(), "127.0.0.1", Port::new(8080).unwrap());
        assert!(body.contains("proxy_pass http://127.0.0.1:8080;"));
        assert!(body.contains("server_name svc.test www.svc.test;"));
        assert!(body.contains("proxy_set_header Upgrade $http_upgrade;"));
        assert!(body.contains("proxy_set_header X-Forwarded-Proto $scheme;"));
        assert!(body.contains("proxy_read_timeout 60s;"));
        assert!(body.contains("location /proxy-health {"));
        assert!(body.contains("return 200 \"healthy\\n\";"));
    }

    #[test]
    fn test_deterministic_except_timestamp() {
        let renderer = ConfigRenderer::new();
        let port = Port::new(8080).unwrap();
        let first = renderer.render_at(&domain(), "127.0.0.1", port, SystemTime::UNIX_EPOCH);
        let later = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
        let second = renderer.render_at(&domain(), "127.0.0.1", port, later);

        assert_ne!(first, second);
        assert_eq!(without_timestamp(&first), without_timestamp(&second));

        let differing: Vec<_> = first
            .lines()
            .zip(second.lines())
            .filter(|(a, b)| a != b)
            .collect();
        assert_eq!(differing.len(), 1);
        assert!(differing[0].0.starts_with(GENERATED_PREFIX));
    }

    #[test]
    fn test_custom_backend_host() {
        let body = ConfigRenderer::new().render(&domain(), "10.0.0.7", Port::new(3000).unwrap());
        assert!(body.contains("proxy_pass http://10.0.0.7:3000;"));
    }
}
