//! Vendor response bodies

/// Served at `/` and `/DYMO/DLS/Printing/Check`
pub const STATUS_PAGE: &str = "<!DOCTYPE html>\
<html><head><title>Dymo Web Service Clone</title></head>\
<body><h1>Dymo Web Service Clone</h1>\
<p>The DYMO Label Web Service is running.</p></body></html>";

pub const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>\
<html><head><title>404 Not Found</title></head>\
<body><h1>404 Not Found</h1>\
<p>The requested resource does not exist on this server.</p></body></html>";

pub const EXCEPTION_PAGE: &str = "<!DOCTYPE html>\
<html><head><title>500 Internal Server Error</title></head>\
<body><h1>500 Internal Server Error</h1>\
<p>An exception occurred while handling the request.</p></body></html>";

/// Placeholder printer identity reported to label SDKs
pub const PRINTER_NAME: &str = "Dymo Web Service Clone";

/// Exception page including the error detail (debug mode only)
pub fn exception_page_with_detail(detail: &str) -> String {
    format!(
        "<!DOCTYPE html>\
<html><head><title>500 Internal Server Error</title></head>\
<body><h1>500 Internal Server Error</h1>\
<pre>{}</pre></body></html>",
        escape_html(detail).replace('\n', "<br>")
    )
}

/// Printer list answered by `/DYMO/DLS/Printing/GetPrinters`
pub fn printers_xml() -> String {
    format!(
        "<Printers><LabelWriterPrinter>\
<Name>{name}</Name>\
<ModelName>{name}</ModelName>\
<IsConnected>True</IsConnected>\
<IsLocal>True</IsLocal>\
<IsTwinTurbo>False</IsTwinTurbo>\
</LabelWriterPrinter></Printers>",
        name = PRINTER_NAME
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
