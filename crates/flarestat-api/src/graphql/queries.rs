// Query documents
//
// Alias names are part of the contract with `flarestat-core`: the section
// parsers look sub-query results up by these aliases under
// `data.viewer.zones[0]`.

/// Trailing-window analytics: daily totals for 30 days, per-country
/// requests and web-performance aggregates for today / 7 days / 30 days.
pub const ROLLING_QUERY: &str = r"
query (
    $zoneTag: String!,
    $monthStart: Date!,
    $todayDate: Date!,
    $todayStart: DateTime!,
    $todayEnd: DateTime!,
    $weekStart: DateTime!,
    $monthStartDt: DateTime!
) {
    viewer {
        zones(filter: { zoneTag: $zoneTag }) {
            httpRequests1dGroups(
                limit: 30
                orderBy: [date_ASC]
                filter: { date_geq: $monthStart, date_leq: $todayDate }
            ) {
                dimensions { date }
                sum { requests bytes }
                uniq { uniques }
            }

            countryToday: httpRequestsAdaptiveGroups(
                limit: 2000
                filter: { datetime_geq: $todayStart, datetime_leq: $todayEnd }
            ) {
                dimensions { clientCountryName }
                sum { requests }
            }

            countryWeek: httpRequestsAdaptiveGroups(
                limit: 2000
                filter: { datetime_geq: $weekStart, datetime_leq: $todayEnd }
            ) {
                dimensions { clientCountryName }
                sum { requests }
            }

            countryMonth: httpRequestsAdaptiveGroups(
                limit: 2000
                filter: { datetime_geq: $monthStartDt, datetime_leq: $todayEnd }
            ) {
                dimensions { clientCountryName }
                sum { requests }
            }

            webToday: rumPageloadEventsAdaptiveGroups(
                limit: 1000
                filter: { datetime_geq: $todayStart, datetime_leq: $todayEnd }
            ) {
                avg { pageLoadTime }
                sum { visits pageViews }
            }

            webWeek: rumPageloadEventsAdaptiveGroups(
                limit: 1000
                filter: { datetime_geq: $weekStart, datetime_leq: $todayEnd }
            ) {
                avg { pageLoadTime }
                sum { visits pageViews }
            }

            webMonth: rumPageloadEventsAdaptiveGroups(
                limit: 1000
                filter: { datetime_geq: $monthStartDt, datetime_leq: $todayEnd }
            ) {
                avg { pageLoadTime }
                sum { visits pageViews }
            }
        }
    }
}
";

/// Today's dashboard totals: cached/uncached/encrypted splits, threats,
/// status-code map, and top-N countries, paths, and user agents.
pub const DASHBOARD_QUERY: &str = r"
query (
    $zoneTag: String!,
    $todayDate: Date!,
    $todayStart: DateTime!,
    $todayEnd: DateTime!,
    $topLimit: Int!
) {
    viewer {
        zones(filter: { zoneTag: $zoneTag }) {
            httpRequests1dGroups(
                limit: 1
                filter: { date: $todayDate }
            ) {
                dimensions { date }
                sum {
                    requests
                    cachedRequests
                    encryptedRequests
                    bytes
                    cachedBytes
                    threats
                    responseStatusMap { edgeResponseStatus requests }
                }
                uniq { uniques }
            }

            topCountries: httpRequestsAdaptiveGroups(
                limit: $topLimit
                orderBy: [count_DESC]
                filter: { datetime_geq: $todayStart, datetime_lt: $todayEnd }
            ) {
                count
                dimensions { clientCountryName }
            }

            topPaths: httpRequestsAdaptiveGroups(
                limit: $topLimit
                orderBy: [count_DESC]
                filter: { datetime_geq: $todayStart, datetime_lt: $todayEnd }
            ) {
                count
                dimensions { clientRequestPath }
            }

            topUserAgents: httpRequestsAdaptiveGroups(
                limit: $topLimit
                orderBy: [count_DESC]
                filter: { datetime_geq: $todayStart, datetime_lt: $todayEnd }
            ) {
                count
                dimensions { userAgent }
            }
        }
    }
}
";
