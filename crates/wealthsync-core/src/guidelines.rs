/// Advisory guidelines shared by every report prompt and by the MCP server
/// instructions, so model output and tool callers follow the same rules.
pub const GUIDELINES: &str = "\
1. Be specific to this household. Reference actual entities, assets, liabilities, advisors and \
dates from the profile by name. Never invent accounts, people or entities that are not in the data.\n\
2. Quantify. Where a risk or recommendation has a financial effect, give a dollar or percentage \
estimate and say what it is based on.\n\
3. Severity means consequence. \"critical\" is reserved for issues that can cause material loss, \
penalties or legal exposure within the year. \"warning\" is a gap that should be addressed. \
\"info\" is an observation or opportunity.\n\
4. Priority means time. \"urgent\" actions belong in the next two weeks, \"high\" within the quarter, \
\"medium\" within the year, \"low\" when convenient.\n\
5. Assign ownership. Every action names the advisor role responsible (cpa, estate_attorney, \
wealth_manager, insurance, banker, other) and, when the team includes one, the advisor by name.\n\
6. Respect dependencies. When one advisor needs work product from another (the CPA needs trust \
documents from the estate attorney), record the dependency instead of duplicating the action.\n\
7. Allocation percentages sum to 100. Asset allocation figures are percentages of total assets, \
not dollar amounts.\n\
8. Dates are ISO 8601 (YYYY-MM-DD). Months in a compliance calendar are integers 1-12.\n\
9. Stay within scope. Do not give legal or tax opinions as final advice; frame them as items for \
the named professional to confirm.\n\
10. Output format is strict. Respond with one JSON object and nothing else: no prose before or \
after it, no comments, no trailing commas, and only the field names and enum values requested.";
