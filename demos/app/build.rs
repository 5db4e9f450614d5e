fn main() -> kiln_scan::Result<()> {
    kiln_scan::build()
}
